use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use service::faq_service::{self, FaqInput};
use uuid::Uuid;

use super::{auth::ServerState, paged, PageQuery};
use crate::errors::{parse_uuid, success, ApiError};
use crate::extract::{JsonBody, SuperAdmin};

fn faq_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_uuid(raw, StatusCode::BAD_REQUEST, "invalid faq id format")
}

#[utoipa::path(post, path = "/api/v1/faq", tag = "faq", request_body = crate::openapi::FaqRequest, responses((status = 201, description = "FAQ created successfully"), (status = 409, description = "question exists"), (status = 422, description = "Validation Error")))]
pub async fn create(State(state): State<ServerState>, _admin: SuperAdmin, JsonBody(input): JsonBody<FaqInput>) -> Result<Response, ApiError> {
    let faq = faq_service::create_faq(&state.db, &input).await?;
    Ok(success(StatusCode::CREATED, "FAQ created successfully", faq))
}

#[utoipa::path(get, path = "/api/v1/faq", tag = "faq", params(PageQuery), responses((status = 200, description = "FAQ retrieved successfully")))]
pub async fn list(State(state): State<ServerState>, Query(q): Query<PageQuery>) -> Result<Response, ApiError> {
    let page = faq_service::list_faqs(&state.db, q.pagination()).await?;
    Ok(paged("FAQ retrieved successfully", page))
}

#[utoipa::path(put, path = "/api/v1/faq/{id}", tag = "faq", request_body = crate::openapi::FaqRequest, responses((status = 200, description = "FAQ updated successfully"), (status = 404, description = "faq not found")))]
pub async fn update(
    State(state): State<ServerState>,
    _admin: SuperAdmin,
    Path(raw): Path<String>,
    JsonBody(input): JsonBody<FaqInput>,
) -> Result<Response, ApiError> {
    let faq = faq_service::update_faq(&state.db, faq_id(&raw)?, &input).await?;
    Ok(success(StatusCode::OK, "FAQ updated successfully", faq))
}

#[utoipa::path(delete, path = "/api/v1/faq/{id}", tag = "faq", responses((status = 200, description = "FAQ deleted successfully"), (status = 404, description = "faq not found")))]
pub async fn delete(State(state): State<ServerState>, _admin: SuperAdmin, Path(raw): Path<String>) -> Result<Response, ApiError> {
    faq_service::delete_faq(&state.db, faq_id(&raw)?).await?;
    Ok(success(StatusCode::OK, "FAQ deleted successfully", serde_json::Value::Null))
}
