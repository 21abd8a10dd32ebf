use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use service::auth::{
    domain::{AuthUser, ChangePasswordInput, LoginInput, RegisterInput},
    repository::AuthRepository,
    service::{AuthConfig, AuthService},
    token::decode_token,
};
use service::invitation::{repository::InvitationRepository, InvitationConfig, InvitationService};
use service::newsletter::{repository::NewsletterRepository, NewsletterService};
use service::org_role::{repository::OrgRoleRepository, OrgRoleService};
use service::organisation::{repository::OrganisationRepository, OrganisationService};

use crate::errors::{success, ApiError};
use crate::extract::{AuthClaims, JsonBody, TOKEN_INVALID, TOKEN_MISSING};
use crate::rate_limiter::RateLimiter;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

/// Repository set behind the services; SeaORM in production, in-memory in tests.
pub struct Repos {
    pub auth: Arc<dyn AuthRepository>,
    pub orgs: Arc<dyn OrganisationRepository>,
    pub roles: Arc<dyn OrgRoleRepository>,
    pub invites: Arc<dyn InvitationRepository>,
    pub newsletter: Arc<dyn NewsletterRepository>,
}

impl Repos {
    pub fn seaorm(db: &DatabaseConnection) -> Self {
        use service::auth::repo::seaorm::SeaOrmAuthRepository;
        use service::invitation::seaorm::SeaOrmInvitationRepository;
        use service::newsletter::seaorm::SeaOrmNewsletterRepository;
        use service::org_role::seaorm::SeaOrmOrgRoleRepository;
        use service::organisation::seaorm::SeaOrmOrganisationRepository;
        Self {
            auth: Arc::new(SeaOrmAuthRepository { db: db.clone() }),
            orgs: Arc::new(SeaOrmOrganisationRepository { db: db.clone() }),
            roles: Arc::new(SeaOrmOrgRoleRepository { db: db.clone() }),
            invites: Arc::new(SeaOrmInvitationRepository { db: db.clone() }),
            newsletter: Arc::new(SeaOrmNewsletterRepository { db: db.clone() }),
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub auth_svc: Arc<AuthService<dyn AuthRepository>>,
    pub org_svc: Arc<OrganisationService>,
    pub role_svc: Arc<OrgRoleService>,
    pub invite_svc: Arc<InvitationService>,
    pub newsletter_svc: Arc<NewsletterService>,
    pub invite_limiter: RateLimiter,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, auth: ServerAuthConfig, invitations: InvitationConfig, repos: Repos) -> Self {
        let auth_cfg = AuthConfig {
            jwt_secret: Some(auth.jwt_secret.clone()),
            token_ttl_hours: auth.token_ttl_hours,
            ..AuthConfig::default()
        };
        Self {
            db,
            auth,
            auth_svc: Arc::new(AuthService::new(repos.auth, auth_cfg)),
            org_svc: Arc::new(OrganisationService::new(repos.orgs.clone())),
            role_svc: Arc::new(OrgRoleService::new(repos.roles, repos.orgs.clone())),
            invite_svc: Arc::new(InvitationService::new(repos.invites, repos.orgs, invitations)),
            newsletter_svc: Arc::new(NewsletterService::new(repos.newsletter)),
            invite_limiter: RateLimiter::default(),
        }
    }

    pub fn with_invite_limiter(mut self, limiter: RateLimiter) -> Self {
        self.invite_limiter = limiter;
        self
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SessionOutput {
    #[schema(value_type = Object)]
    pub user: AuthUser,
    pub access_token: String,
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(post, path = "/api/v1/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "user created successfully"), (status = 400, description = "user already exists with the given email"), (status = 422, description = "Validation Error")))]
pub async fn register(State(state): State<ServerState>, JsonBody(input): JsonBody<RegisterInput>) -> Result<Response, ApiError> {
    let session = state.auth_svc.register(input).await?;
    let access_token = session.token.ok_or_else(|| ApiError::internal("token generation failed"))?;
    Ok(success(StatusCode::CREATED, "user created successfully", SessionOutput { user: session.user, access_token }))
}

#[utoipa::path(post, path = "/api/v1/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "user login successfully"), (status = 400, description = "invalid credentials")))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, JsonBody(input): JsonBody<LoginInput>) -> Result<Response, ApiError> {
    let session = state.auth_svc.login(input).await?;
    let access_token = session.token.ok_or_else(|| ApiError::internal("token generation failed"))?;
    let jar = jar.add(session_cookie(access_token.clone()));
    let body = success(StatusCode::OK, "user login successfully", SessionOutput { user: session.user, access_token });
    Ok((jar, body).into_response())
}

#[utoipa::path(post, path = "/api/v1/auth/logout", tag = "auth", responses((status = 200, description = "user logout successfully")))]
pub async fn logout(AuthClaims(claims): AuthClaims, jar: CookieJar) -> Response {
    tracing::info!(user_id = %claims.user_id, "user_logged_out");
    let mut removal = Cookie::from(AUTH_COOKIE);
    removal.set_path("/");
    let jar = jar.remove(removal);
    (jar, success(StatusCode::OK, "user logout successfully", serde_json::Value::Null)).into_response()
}

#[utoipa::path(put, path = "/api/v1/auth/change-password", tag = "auth", responses((status = 200, description = "password updated successfully"), (status = 400, description = "old password is incorrect"), (status = 409, description = "new password cannot be the same as the old password")))]
pub async fn change_password(
    State(state): State<ServerState>,
    AuthClaims(claims): AuthClaims,
    JsonBody(input): JsonBody<ChangePasswordInput>,
) -> Result<Response, ApiError> {
    state.auth_svc.change_password(claims.user_id, input).await?;
    Ok(success(StatusCode::OK, "password updated successfully", serde_json::Value::Null))
}

/// 公开路由白名单：无需 token
fn is_public(method: &Method, path: &str) -> bool {
    if method == Method::OPTIONS {
        return true;
    }
    match path {
        "/health" | "/api/v1/health" | "/metrics" => return true,
        "/api/v1/auth/register" | "/api/v1/auth/login" | "/api/v1/newsletter-subscription" => {
            return method == Method::POST
        }
        "/api/v1/faq" => return method == Method::GET,
        _ => {}
    }
    if path == "/api/v1/billing-plans" || path.starts_with("/api/v1/billing-plans/") {
        return method == Method::GET;
    }
    path.starts_with("/docs") || path.starts_with("/api-docs")
}

/// 读取 Authorization: Bearer <token>；缺失时回退到 auth_token cookie
fn bearer_token(req: &Request) -> Option<String> {
    if let Some(h) = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        return h.strip_prefix("Bearer ").map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    }
    let cookie_header = req
        .headers()
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    cookie_header
        .split(';')
        .filter_map(|kv| kv.trim().strip_prefix("auth_token="))
        .map(str::to_string)
        .find(|t| !t.is_empty())
}

/// 全局中间件：白名单之外的请求必须携带有效 token
/// 缺失 token 返回 401 "Token could not be found!"，非法或过期返回 401 "Token is invalid!"
/// 校验通过后将 Claims 注入 request 扩展
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();
    if is_public(req.method(), &path) {
        return Ok(next.run(req).await);
    }

    let Some(token) = bearer_token(&req) else {
        tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
        return Err(ApiError::unauthorized(TOKEN_MISSING));
    };

    match decode_token(&state.auth.jwt_secret, &token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            Err(ApiError::unauthorized(TOKEN_INVALID))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes_depend_on_method() {
        assert!(is_public(&Method::POST, "/api/v1/newsletter-subscription"));
        assert!(!is_public(&Method::GET, "/api/v1/newsletter-subscription"));
        assert!(is_public(&Method::GET, "/api/v1/billing-plans/123"));
        assert!(!is_public(&Method::DELETE, "/api/v1/billing-plans/123"));
        assert!(is_public(&Method::GET, "/api/v1/faq"));
        assert!(!is_public(&Method::POST, "/api/v1/faq"));
        assert!(!is_public(&Method::GET, "/api/v1/organisations/x"));
    }
}
