use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use models::organisation::{NewOrganisation, OrganisationPatch};
use serde::Deserialize;
use uuid::Uuid;

use super::{auth::ServerState, paged, PageQuery};
use crate::errors::{parse_uuid, success, ApiError};
use crate::extract::{AuthClaims, JsonBody, SuperAdmin};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddUserInput {
    pub user_id: String,
}

pub(crate) fn org_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_uuid(raw, StatusCode::BAD_REQUEST, "invalid organisation id format")
}

#[utoipa::path(post, path = "/api/v1/organisations", tag = "organisations", request_body = crate::openapi::CreateOrganisationRequest, responses((status = 201, description = "organisation created successfully"), (status = 400, description = "organization already exists with the given email")))]
pub async fn create(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    JsonBody(input): JsonBody<NewOrganisation>,
) -> Result<Response, ApiError> {
    let org = state.org_svc.create(claims.user_id, input).await?;
    Ok(success(StatusCode::CREATED, "organisation created successfully", org))
}

#[utoipa::path(get, path = "/api/v1/organisations/{org_id}", tag = "organisations", responses((status = 200, description = "organisation retrieved successfully"), (status = 403, description = "user not authorised to retrieve this organisation"), (status = 404, description = "organisation not found")))]
pub async fn get(State(state): State<ServerState>, AuthClaims(claims): AuthClaims, Path(raw): Path<String>) -> Result<Response, ApiError> {
    let org = state.org_svc.get(org_id(&raw)?, claims.user_id).await?;
    Ok(success(StatusCode::OK, "organisation retrieved successfully", org))
}

#[utoipa::path(patch, path = "/api/v1/organisations/{org_id}", tag = "organisations", responses((status = 200, description = "organisation updated successfully")))]
pub async fn update(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    Path(raw): Path<String>,
    JsonBody(patch): JsonBody<OrganisationPatch>,
) -> Result<Response, ApiError> {
    let org = state.org_svc.update(org_id(&raw)?, claims.user_id, patch).await?;
    Ok(success(StatusCode::OK, "organisation updated successfully", org))
}

#[utoipa::path(delete, path = "/api/v1/organisations/{org_id}", tag = "organisations", responses((status = 200, description = "organisation deleted successfully"), (status = 403, description = "not organization owner")))]
pub async fn delete(State(state): State<ServerState>, AuthClaims(claims): AuthClaims, Path(raw): Path<String>) -> Result<Response, ApiError> {
    state.org_svc.delete(org_id(&raw)?, claims.user_id).await?;
    Ok(success(StatusCode::OK, "organisation deleted successfully", serde_json::Value::Null))
}

#[utoipa::path(get, path = "/api/v1/organisations/{org_id}/users", tag = "organisations", params(PageQuery), responses((status = 200, description = "users retrieved successfully")))]
pub async fn list_users(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    Path(raw): Path<String>,
    Query(q): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let page = state.org_svc.list_users(org_id(&raw)?, claims.user_id, q.pagination()).await?;
    Ok(paged("users retrieved successfully", page))
}

#[utoipa::path(post, path = "/api/v1/organisations/{org_id}/users", tag = "organisations", request_body = AddUserInput, responses((status = 200, description = "user added to organisation successfully"), (status = 400, description = "user already added to organisation")))]
pub async fn add_user(
    State(state): State<ServerState>,
    _admin: SuperAdmin,
    Path(raw): Path<String>,
    JsonBody(input): JsonBody<AddUserInput>,
) -> Result<Response, ApiError> {
    let org = org_id(&raw)?;
    let user = parse_uuid(&input.user_id, StatusCode::BAD_REQUEST, "invalid user id format")?;
    state.org_svc.add_user(org, user).await?;
    Ok(success(StatusCode::OK, "user added to organisation successfully", serde_json::Value::Null))
}
