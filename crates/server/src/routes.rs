pub mod auth;
pub mod billing;
pub mod faq;
pub mod invitations;
pub mod newsletter;
pub mod notifications;
pub mod org_roles;
pub mod organisations;
pub mod users;

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use common::types::{ApiResponse, Health};
use serde::{Deserialize, Serialize};
use service::pagination::{Page, Pagination};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::metrics;
use crate::openapi::ApiDoc;
use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// `?page=&limit=` as raw strings so garbage falls back to defaults instead of 400.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_query(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Success envelope carrying a page of items plus its pagination block.
pub fn paged<T: Serialize>(message: &str, page: Page<T>) -> Response {
    let body = ApiResponse::success(StatusCode::OK.as_u16(), message, Some(page.items)).with_pagination(page.meta);
    (StatusCode::OK, Json(body)).into_response()
}

/// Build the full application router, including public, authenticated and super-admin routes
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        // auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/change-password", put(auth::change_password))
        // users
        .route("/users", get(users::list))
        .route("/users/:user_id", get(users::get).put(users::update).delete(users::delete))
        .route("/users/:user_id/organisations", get(users::organisations))
        .route("/users/:user_id/roles/:role_id", put(users::assign_role))
        // organisations
        .route("/organisations", post(organisations::create))
        .route(
            "/organisations/:org_id",
            get(organisations::get).patch(organisations::update).delete(organisations::delete),
        )
        .route("/organisations/:org_id/users", get(organisations::list_users).post(organisations::add_user))
        // organisation roles
        .route("/organisations/:org_id/roles", post(org_roles::create).get(org_roles::list))
        .route(
            "/organisations/:org_id/roles/:role_id",
            get(org_roles::get).patch(org_roles::update).delete(org_roles::delete),
        )
        .route("/organisations/:org_id/roles/:role_id/permissions", patch(org_roles::update_permissions))
        // invitations
        .route("/invite/create", post(invitations::create))
        .route("/invite/accept", post(invitations::accept))
        .route("/invite/accept/:token", get(invitations::accept_token))
        .route("/invite/deactivate", post(invitations::deactivate))
        .route(
            "/organization/send-invite",
            post(invitations::send_batch)
                .route_layer(middleware::from_fn_with_state(state.clone(), crate::rate_limiter::limit_send_invites)),
        )
        .route("/organization/invitations", get(invitations::list))
        // newsletter
        .route("/newsletter-subscription", post(newsletter::subscribe).get(newsletter::list))
        .route("/newsletter-subscription/deleted", get(newsletter::list_deleted))
        .route("/newsletter-subscription/restore/:id", patch(newsletter::restore))
        .route("/newsletter-subscription/:id", axum::routing::delete(newsletter::delete))
        // faq
        .route("/faq", post(faq::create).get(faq::list))
        .route("/faq/:id", put(faq::update).delete(faq::delete))
        // billing
        .route("/billing-plans", post(billing::create).get(billing::list))
        .route("/billing-plans/:id", get(billing::get).patch(billing::update).delete(billing::delete))
        // notifications
        .route("/notifications", post(notifications::create).get(notifications::list))
        .route(
            "/notifications/:segment",
            get(notifications::list_by_read_state)
                .patch(notifications::update)
                .delete(notifications::delete),
        )
        .route("/notification-settings", get(notifications::get_settings).patch(notifications::update_settings));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/api/v1", api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state))
        .with_state(state)
        .layer(middleware::from_fn(metrics::track))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 请求到达时打点
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
