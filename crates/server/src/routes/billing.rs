use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use service::billing_service::{self, BillingInput, BillingPatch};
use uuid::Uuid;

use super::{auth::ServerState, paged, PageQuery};
use crate::errors::{parse_uuid, success, ApiError};
use crate::extract::{JsonBody, SuperAdmin};

fn plan_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_uuid(raw, StatusCode::BAD_REQUEST, "invalid billing plan id format")
}

#[utoipa::path(post, path = "/api/v1/billing-plans", tag = "billing", request_body = crate::openapi::BillingRequest, responses((status = 201, description = "Billing plan created successfully")))]
pub async fn create(State(state): State<ServerState>, _admin: SuperAdmin, JsonBody(input): JsonBody<BillingInput>) -> Result<Response, ApiError> {
    let plan = billing_service::create_plan(&state.db, &input).await?;
    Ok(success(StatusCode::CREATED, "Billing plan created successfully", plan))
}

#[utoipa::path(get, path = "/api/v1/billing-plans", tag = "billing", params(PageQuery), responses((status = 200, description = "Billing plans retrieved successfully")))]
pub async fn list(State(state): State<ServerState>, Query(q): Query<PageQuery>) -> Result<Response, ApiError> {
    let page = billing_service::list_plans(&state.db, q.pagination()).await?;
    Ok(paged("Billing plans retrieved successfully", page))
}

#[utoipa::path(get, path = "/api/v1/billing-plans/{id}", tag = "billing", responses((status = 200, description = "Billing plan retrieved successfully"), (status = 404, description = "billing plan not found")))]
pub async fn get(State(state): State<ServerState>, Path(raw): Path<String>) -> Result<Response, ApiError> {
    let plan = billing_service::get_plan(&state.db, plan_id(&raw)?).await?;
    Ok(success(StatusCode::OK, "Billing plan retrieved successfully", plan))
}

#[utoipa::path(patch, path = "/api/v1/billing-plans/{id}", tag = "billing", responses((status = 200, description = "Billing plan updated successfully")))]
pub async fn update(
    State(state): State<ServerState>,
    _admin: SuperAdmin,
    Path(raw): Path<String>,
    JsonBody(patch): JsonBody<BillingPatch>,
) -> Result<Response, ApiError> {
    let plan = billing_service::update_plan(&state.db, plan_id(&raw)?, &patch).await?;
    Ok(success(StatusCode::OK, "Billing plan updated successfully", plan))
}

#[utoipa::path(delete, path = "/api/v1/billing-plans/{id}", tag = "billing", responses((status = 200, description = "Billing plan deleted successfully")))]
pub async fn delete(State(state): State<ServerState>, _admin: SuperAdmin, Path(raw): Path<String>) -> Result<Response, ApiError> {
    billing_service::delete_plan(&state.db, plan_id(&raw)?).await?;
    Ok(success(StatusCode::OK, "Billing plan deleted successfully", serde_json::Value::Null))
}
