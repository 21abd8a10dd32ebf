use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::{Deserialize, Serialize};
use service::invitation::{CreateInvitation, SendInvites};
use uuid::Uuid;

use super::{auth::ServerState, paged, PageQuery};
use crate::errors::{success, ApiError};
use crate::extract::{AuthClaims, JsonBody, SuperAdmin};
use crate::metrics::{INVITATIONS_ACCEPTED_TOTAL, INVITATIONS_ISSUED_TOTAL};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct InvitationLinkInput {
    #[serde(default)]
    pub invitation_link: String,
}

#[derive(Debug, Serialize)]
pub struct LinkOutput {
    pub invitation_link: String,
}

#[derive(Debug, Serialize)]
pub struct AcceptOutput {
    pub organisation_id: Uuid,
}

#[utoipa::path(post, path = "/api/v1/invite/create", tag = "invitations", request_body = crate::openapi::CreateInvitationRequest, responses((status = 201, description = "Invitation created successfully"), (status = 400, description = "Invalid email format"), (status = 403, description = "User is not an admin of the organisation"), (status = 404, description = "Invalid Organisation ID"), (status = 422, description = "Invalid Organisation ID")))]
pub async fn create(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    JsonBody(input): JsonBody<CreateInvitation>,
) -> Result<Response, ApiError> {
    let sent = state.invite_svc.create(claims.user_id, input).await?;
    INVITATIONS_ISSUED_TOTAL.inc();
    Ok(success(StatusCode::CREATED, "Invitation created successfully", LinkOutput { invitation_link: sent.invitation_link }))
}

#[utoipa::path(post, path = "/api/v1/organization/send-invite", tag = "invitations", request_body = crate::openapi::SendInvitesRequest, responses((status = 201, description = "Invitation(s) sent successfully"), (status = 409, description = "Duplicate emails found"), (status = 413, description = "Payload too large; email limit exceeded"), (status = 429, description = "Limit exceed")))]
pub async fn send_batch(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    JsonBody(input): JsonBody<SendInvites>,
) -> Result<Response, ApiError> {
    let result = state.invite_svc.send_batch(claims.user_id, input).await?;
    INVITATIONS_ISSUED_TOTAL.inc_by(result.invitations.len() as u64);
    Ok(success(StatusCode::CREATED, "Invitation(s) sent successfully", result))
}

async fn redeem(state: &ServerState, user_id: Uuid, link: &str) -> Result<Response, ApiError> {
    let organisation_id = state.invite_svc.accept(user_id, link).await?;
    INVITATIONS_ACCEPTED_TOTAL.inc();
    Ok(success(StatusCode::OK, "Invitation accepted successfully", AcceptOutput { organisation_id }))
}

#[utoipa::path(post, path = "/api/v1/invite/accept", tag = "invitations", request_body = InvitationLinkInput, responses((status = 200, description = "Invitation accepted successfully"), (status = 400, description = "Invalid, expired or used invitation link"), (status = 404, description = "Organization not found")))]
pub async fn accept(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    JsonBody(input): JsonBody<InvitationLinkInput>,
) -> Result<Response, ApiError> {
    redeem(&state, claims.user_id, &input.invitation_link).await
}

#[utoipa::path(get, path = "/api/v1/invite/accept/{token}", tag = "invitations", responses((status = 200, description = "Invitation accepted successfully")))]
pub async fn accept_token(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    redeem(&state, claims.user_id, &token).await
}

#[utoipa::path(post, path = "/api/v1/invite/deactivate", tag = "invitations", request_body = InvitationLinkInput, responses((status = 200, description = "Invitation deactivated successfully"), (status = 403, description = "not organization owner")))]
pub async fn deactivate(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    JsonBody(input): JsonBody<InvitationLinkInput>,
) -> Result<Response, ApiError> {
    state.invite_svc.deactivate(claims.user_id, &input.invitation_link).await?;
    Ok(success(StatusCode::OK, "Invitation deactivated successfully", serde_json::Value::Null))
}

#[utoipa::path(get, path = "/api/v1/organization/invitations", tag = "invitations", params(PageQuery), responses((status = 200, description = "Invitations retrieved successfully")))]
pub async fn list(State(state): State<ServerState>, _admin: SuperAdmin, Query(q): Query<PageQuery>) -> Result<Response, ApiError> {
    let page = state.invite_svc.list(q.pagination()).await?;
    Ok(paged("Invitations retrieved successfully", page))
}
