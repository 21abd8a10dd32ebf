use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{auth::ServerState, paged, PageQuery};
use crate::errors::{parse_uuid, success, ApiError};
use crate::extract::{JsonBody, SuperAdmin};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubscribeInput {
    #[serde(default)]
    pub email: String,
}

fn newsletter_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_uuid(raw, StatusCode::BAD_REQUEST, "invalid newsletter id format")
}

#[utoipa::path(post, path = "/api/v1/newsletter-subscription", tag = "newsletter", request_body = SubscribeInput, responses((status = 201, description = "subscribed successfully"), (status = 409, description = "email already subscribed"), (status = 422, description = "invalid email")))]
pub async fn subscribe(State(state): State<ServerState>, JsonBody(input): JsonBody<SubscribeInput>) -> Result<Response, ApiError> {
    state.newsletter_svc.subscribe(&input.email).await?;
    Ok(success(StatusCode::CREATED, "subscribed successfully", serde_json::Value::Null))
}

#[utoipa::path(get, path = "/api/v1/newsletter-subscription", tag = "newsletter", params(PageQuery), responses((status = 200, description = "newsletters email retrieved successfully")))]
pub async fn list(State(state): State<ServerState>, _admin: SuperAdmin, Query(q): Query<PageQuery>) -> Result<Response, ApiError> {
    let page = state.newsletter_svc.list(q.pagination()).await?;
    Ok(paged("newsletters email retrieved successfully", page))
}

#[utoipa::path(get, path = "/api/v1/newsletter-subscription/deleted", tag = "newsletter", params(PageQuery), responses((status = 200, description = "soft deleted newsletter emails retrieved successfully")))]
pub async fn list_deleted(State(state): State<ServerState>, _admin: SuperAdmin, Query(q): Query<PageQuery>) -> Result<Response, ApiError> {
    let page = state.newsletter_svc.list_deleted(q.pagination()).await?;
    Ok(paged("soft deleted newsletter emails retrieved successfully", page))
}

#[utoipa::path(delete, path = "/api/v1/newsletter-subscription/{id}", tag = "newsletter", responses((status = 200, description = "newsletter email deleted successfully"), (status = 404, description = "newsletter email not found")))]
pub async fn delete(State(state): State<ServerState>, _admin: SuperAdmin, Path(raw): Path<String>) -> Result<Response, ApiError> {
    state.newsletter_svc.delete(newsletter_id(&raw)?).await?;
    Ok(success(StatusCode::OK, "newsletter email deleted successfully", serde_json::Value::Null))
}

#[utoipa::path(patch, path = "/api/v1/newsletter-subscription/restore/{id}", tag = "newsletter", responses((status = 200, description = "newsletter email restored successfully"), (status = 400, description = "newsletter email is not soft-deleted")))]
pub async fn restore(State(state): State<ServerState>, _admin: SuperAdmin, Path(raw): Path<String>) -> Result<Response, ApiError> {
    state.newsletter_svc.restore(newsletter_id(&raw)?).await?;
    Ok(success(StatusCode::OK, "newsletter email restored successfully", serde_json::Value::Null))
}
