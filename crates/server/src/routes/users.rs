use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use service::user_service::{self, UserView};
use uuid::Uuid;

use super::{auth::ServerState, paged, PageQuery};
use crate::errors::{parse_uuid, success, ApiError};
use crate::extract::{AuthClaims, JsonBody, SuperAdmin};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateUserInput {
    pub name: Option<String>,
}

fn user_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_uuid(raw, StatusCode::BAD_REQUEST, "invalid user id format")
}

#[utoipa::path(get, path = "/api/v1/users/{user_id}", tag = "users", responses((status = 200, description = "user retrieved successfully"), (status = 404, description = "user not found")))]
pub async fn get(State(state): State<ServerState>, _claims: AuthClaims, Path(raw): Path<String>) -> Result<Response, ApiError> {
    let user = user_service::get_user(&state.db, user_id(&raw)?).await?;
    Ok(success(StatusCode::OK, "user retrieved successfully", UserView::from(user)))
}

#[utoipa::path(put, path = "/api/v1/users/{user_id}", tag = "users", request_body = UpdateUserInput, responses((status = 200, description = "user updated successfully"), (status = 403, description = "Forbidden")))]
pub async fn update(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    Path(raw): Path<String>,
    JsonBody(input): JsonBody<UpdateUserInput>,
) -> Result<Response, ApiError> {
    let id = user_id(&raw)?;
    user_service::can_manage(claims.user_id, claims.is_super_admin(), id)?;
    let user = match input.name {
        Some(name) => user_service::update_user_name(&state.db, id, &name).await?,
        None => user_service::get_user(&state.db, id).await?,
    };
    Ok(success(StatusCode::OK, "user updated successfully", UserView::from(user)))
}

#[utoipa::path(delete, path = "/api/v1/users/{user_id}", tag = "users", responses((status = 200, description = "user deleted successfully"), (status = 403, description = "Forbidden")))]
pub async fn delete(State(state): State<ServerState>, AuthClaims(claims): AuthClaims, Path(raw): Path<String>) -> Result<Response, ApiError> {
    let id = user_id(&raw)?;
    user_service::can_manage(claims.user_id, claims.is_super_admin(), id)?;
    user_service::soft_delete_user(&state.db, id).await?;
    tracing::info!(user_id = %id, by = %claims.user_id, "user_deleted");
    Ok(success(StatusCode::OK, "user deleted successfully", serde_json::Value::Null))
}

#[utoipa::path(get, path = "/api/v1/users/{user_id}/organisations", tag = "users", responses((status = 200, description = "user organisations retrieved successfully")))]
pub async fn organisations(State(state): State<ServerState>, _claims: AuthClaims, Path(raw): Path<String>) -> Result<Response, ApiError> {
    let orgs = state.org_svc.list_for_user(user_id(&raw)?).await?;
    Ok(success(StatusCode::OK, "user organisations retrieved successfully", orgs))
}

#[utoipa::path(put, path = "/api/v1/users/{user_id}/roles/{role_id}", tag = "users", responses((status = 200, description = "Role updated successfully"), (status = 400, description = "Failed to parse request body"), (status = 401, description = "role not authorized!"), (status = 404, description = "invalid user or invalid role")))]
pub async fn assign_role(
    State(state): State<ServerState>,
    _admin: SuperAdmin,
    Path((raw_user, raw_role)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let id = user_id(&raw_user)?;
    let role = user_service::parse_role(&raw_role)?;
    let user = user_service::assign_role(&state.db, id, role).await?;
    Ok(success(StatusCode::OK, "Role updated successfully", UserView::from(user)))
}

#[utoipa::path(get, path = "/api/v1/users", tag = "users", params(PageQuery), responses((status = 200, description = "users retrieved successfully"), (status = 401, description = "role not authorized!")))]
pub async fn list(State(state): State<ServerState>, _admin: SuperAdmin, Query(q): Query<PageQuery>) -> Result<Response, ApiError> {
    let page = user_service::list_users(&state.db, q.pagination()).await?;
    Ok(paged("users retrieved successfully", page))
}
