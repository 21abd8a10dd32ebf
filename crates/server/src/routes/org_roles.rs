use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use service::org_role::{PermissionUpdate, RoleInput, RolePatch};
use uuid::Uuid;

use super::{auth::ServerState, organisations::org_id};
use crate::errors::{parse_uuid, success, ApiError};
use crate::extract::{AuthClaims, JsonBody};

#[derive(Debug, Serialize)]
pub struct RoleCreated {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub message: &'static str,
}

fn ids(org: &str, role: &str) -> Result<(Uuid, Uuid), ApiError> {
    Ok((org_id(org)?, parse_uuid(role, StatusCode::BAD_REQUEST, "invalid role id format")?))
}

#[utoipa::path(post, path = "/api/v1/organisations/{org_id}/roles", tag = "roles", request_body = crate::openapi::CreateRoleRequest, responses((status = 201, description = "Role created successfully"), (status = 403, description = "not organization owner"), (status = 409, description = "role name already exists")))]
pub async fn create(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    Path(raw): Path<String>,
    JsonBody(input): JsonBody<RoleInput>,
) -> Result<Response, ApiError> {
    let role = state.role_svc.create(org_id(&raw)?, claims.user_id, input).await?;
    let out = RoleCreated { id: role.id, name: role.name, description: role.description, message: "Role created successfully" };
    Ok(success(StatusCode::CREATED, "Role created successfully", out))
}

#[utoipa::path(get, path = "/api/v1/organisations/{org_id}/roles", tag = "roles", responses((status = 200, description = "roles retrieved successfully")))]
pub async fn list(State(state): State<ServerState>, AuthClaims(claims): AuthClaims, Path(raw): Path<String>) -> Result<Response, ApiError> {
    let roles = state.role_svc.list(org_id(&raw)?, claims.user_id).await?;
    Ok(success(StatusCode::OK, "roles retrieved successfully", roles))
}

#[utoipa::path(get, path = "/api/v1/organisations/{org_id}/roles/{role_id}", tag = "roles", responses((status = 200, description = "role retrieved successfully"), (status = 404, description = "role not found")))]
pub async fn get(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    Path((org, role)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (org, role) = ids(&org, &role)?;
    let view = state.role_svc.get(org, claims.user_id, role).await?;
    Ok(success(StatusCode::OK, "role retrieved successfully", view))
}

#[utoipa::path(patch, path = "/api/v1/organisations/{org_id}/roles/{role_id}", tag = "roles", responses((status = 200, description = "role updated successfully"), (status = 409, description = "role name already exists")))]
pub async fn update(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    Path((org, role)): Path<(String, String)>,
    JsonBody(patch): JsonBody<RolePatch>,
) -> Result<Response, ApiError> {
    let (org, role) = ids(&org, &role)?;
    let updated = state.role_svc.update(org, claims.user_id, role, patch).await?;
    Ok(success(StatusCode::OK, "role updated successfully", updated))
}

#[utoipa::path(delete, path = "/api/v1/organisations/{org_id}/roles/{role_id}", tag = "roles", responses((status = 204, description = "role deleted")))]
pub async fn delete(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    Path((org, role)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (org, role) = ids(&org, &role)?;
    state.role_svc.delete(org, claims.user_id, role).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(patch, path = "/api/v1/organisations/{org_id}/roles/{role_id}/permissions", tag = "roles", responses((status = 200, description = "permissions updated successfully")))]
pub async fn update_permissions(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    Path((org, role)): Path<(String, String)>,
    JsonBody(update): JsonBody<PermissionUpdate>,
) -> Result<Response, ApiError> {
    let (org, role) = ids(&org, &role)?;
    let perms = state.role_svc.update_permissions(org, claims.user_id, role, update).await?;
    Ok(success(StatusCode::OK, "permissions updated successfully", perms))
}
