use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use models::notification_settings::SettingsPatch;
use serde::Deserialize;
use service::notification_service;
use uuid::Uuid;

use super::auth::ServerState;
use crate::errors::{parse_uuid, success, ApiError};
use crate::extract::{AuthClaims, JsonBody};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct NotificationInput {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReadStateInput {
    pub is_read: bool,
}

fn notification_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_uuid(raw, StatusCode::BAD_REQUEST, "invalid notification id format")
}

#[utoipa::path(post, path = "/api/v1/notifications", tag = "notifications", request_body = NotificationInput, responses((status = 201, description = "Notification created successfully")))]
pub async fn create(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    JsonBody(input): JsonBody<NotificationInput>,
) -> Result<Response, ApiError> {
    let n = notification_service::create_notification(&state.db, claims.user_id, &input.message).await?;
    Ok(success(StatusCode::CREATED, "Notification created successfully", n))
}

#[utoipa::path(get, path = "/api/v1/notifications", tag = "notifications", responses((status = 200, description = "Notifications retrieved successfully")))]
pub async fn list(State(state): State<ServerState>, AuthClaims(claims): AuthClaims) -> Result<Response, ApiError> {
    let summary = notification_service::list_notifications(&state.db, claims.user_id, None).await?;
    Ok(success(StatusCode::OK, "Notifications retrieved successfully", summary))
}

/// `GET /notifications/{true|false}`
#[utoipa::path(get, path = "/api/v1/notifications/{is_read}", tag = "notifications", responses((status = 200, description = "Notifications retrieved successfully"), (status = 400, description = "is_read must be true or false")))]
pub async fn list_by_read_state(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    Path(segment): Path<String>,
) -> Result<Response, ApiError> {
    let is_read = notification_service::parse_is_read(&segment)?;
    let summary = notification_service::list_notifications(&state.db, claims.user_id, Some(is_read)).await?;
    Ok(success(StatusCode::OK, "Notifications retrieved successfully", summary))
}

#[utoipa::path(patch, path = "/api/v1/notifications/{notification_id}", tag = "notifications", request_body = ReadStateInput, responses((status = 200, description = "Notification updated successfully"), (status = 404, description = "notification not found")))]
pub async fn update(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    Path(segment): Path<String>,
    JsonBody(input): JsonBody<ReadStateInput>,
) -> Result<Response, ApiError> {
    let n = notification_service::mark_read(&state.db, claims.user_id, notification_id(&segment)?, input.is_read).await?;
    Ok(success(StatusCode::OK, "Notification updated successfully", n))
}

#[utoipa::path(delete, path = "/api/v1/notifications/{notification_id}", tag = "notifications", responses((status = 200, description = "Notification deleted successfully")))]
pub async fn delete(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    Path(segment): Path<String>,
) -> Result<Response, ApiError> {
    notification_service::delete_notification(&state.db, claims.user_id, notification_id(&segment)?).await?;
    Ok(success(StatusCode::OK, "Notification deleted successfully", serde_json::Value::Null))
}

#[utoipa::path(get, path = "/api/v1/notification-settings", tag = "notifications", responses((status = 200, description = "Notification settings retrieved successfully")))]
pub async fn get_settings(State(state): State<ServerState>, AuthClaims(claims): AuthClaims) -> Result<Response, ApiError> {
    let s = notification_service::get_settings(&state.db, claims.user_id).await?;
    Ok(success(StatusCode::OK, "Notification settings retrieved successfully", s))
}

#[utoipa::path(patch, path = "/api/v1/notification-settings", tag = "notifications", responses((status = 200, description = "Notification settings updated successfully")))]
pub async fn update_settings(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    JsonBody(patch): JsonBody<SettingsPatch>,
) -> Result<Response, ApiError> {
    let s = notification_service::update_settings(&state.db, claims.user_id, &patch).await?;
    Ok(success(StatusCode::OK, "Notification settings updated successfully", s))
}
