//! Router-level tests with in-memory repositories; no database required.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use server::rate_limiter::RateLimiter;
use server::routes::{self, auth};
use service::auth::domain::AuthUser;
use service::auth::repository::mock::MockAuthRepository;
use service::auth::token::issue_token;
use service::invitation::{repository::mock::MockInvitationRepository, InvitationConfig};
use service::newsletter::repository::mock::MockNewsletterRepository;
use service::org_role::repository::mock::MockOrgRoleRepository;
use service::organisation::repository::mock::MockOrganisationRepository;

const SECRET: &str = "test-secret";

fn build_app() -> Router {
    build_app_with(Arc::new(MockOrganisationRepository::default()))
}

fn build_app_with(orgs: Arc<MockOrganisationRepository>) -> Router {
    routes::build_router(build_state(orgs), tower_http::cors::CorsLayer::very_permissive())
}

fn build_state(orgs: Arc<MockOrganisationRepository>) -> auth::ServerState {
    let repos = auth::Repos {
        auth: Arc::new(MockAuthRepository::default()),
        orgs: orgs.clone(),
        roles: Arc::new(MockOrgRoleRepository::default()),
        invites: Arc::new(MockInvitationRepository::with_members(orgs)),
        newsletter: Arc::new(MockNewsletterRepository::default()),
    };
    auth::ServerState::new(
        DatabaseConnection::Disconnected,
        auth::ServerAuthConfig { jwt_secret: SECRET.into(), token_ttl_hours: 1 },
        InvitationConfig { base_url: "https://portal.test".into(), ttl_hours: 24, max_invites_per_request: 3 },
        repos,
    )
}

struct Reply {
    status: StatusCode,
    body: Value,
    set_cookie: Option<String>,
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(v) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&v).unwrap()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply { status, body, set_cookie }
}

/// Register a user and return (user_id, access_token).
async fn register(app: &Router, email: &str) -> (Uuid, String) {
    let r = send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({"first_name": "Test", "last_name": "User", "email": email, "password": "Passw0rd!"})),
    )
    .await;
    assert_eq!(r.status, StatusCode::CREATED, "{}", r.body);
    let id = Uuid::parse_str(r.body["data"]["user"]["id"].as_str().unwrap()).unwrap();
    (id, r.body["data"]["access_token"].as_str().unwrap().to_string())
}

async fn create_org(app: &Router, token: &str, email: &str) -> String {
    let r = send(app, Method::POST, "/api/v1/organisations", Some(token), Some(json!({"name": "Acme", "email": email}))).await;
    assert_eq!(r.status, StatusCode::CREATED, "{}", r.body);
    assert_eq!(r.body["message"], "organisation created successfully");
    r.body["data"]["id"].as_str().unwrap().to_string()
}

fn super_admin_token() -> String {
    let admin = AuthUser { id: Uuid::new_v4(), email: "root@portal.test".into(), name: "Root".into(), role: 2 };
    issue_token(SECRET, &admin, Duration::hours(1)).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = build_app();
    let r = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["status"], "ok");
    let r = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(r.status, StatusCode::OK);
}

#[tokio::test]
async fn register_duplicate_and_login() {
    let app = build_app();
    register(&app, "Ada@Example.com").await;

    let dup = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({"first_name": "Ada", "last_name": "L", "email": "ada@example.com", "password": "Passw0rd!"})),
    )
    .await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body["status"], "error");
    assert_eq!(dup.body["message"], "user already exists with the given email");

    let bad = send(&app, Method::POST, "/api/v1/auth/login", None, Some(json!({"email": "ada@example.com", "password": "wrong-pass"}))).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad.body["message"], "invalid credentials");

    let ok = send(&app, Method::POST, "/api/v1/auth/login", None, Some(json!({"email": "ada@example.com", "password": "Passw0rd!"}))).await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["message"], "user login successfully");
    assert!(ok.set_cookie.unwrap_or_default().starts_with("auth_token="));
}

#[tokio::test]
async fn protected_routes_require_valid_token() {
    let app = build_app();
    let missing = send(&app, Method::GET, "/api/v1/notifications", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["message"], "Token could not be found!");

    let invalid = send(&app, Method::GET, "/api/v1/notifications", Some("not-a-jwt"), None).await;
    assert_eq!(invalid.status, StatusCode::UNAUTHORIZED);
    assert_eq!(invalid.body["message"], "Token is invalid!");
}

#[tokio::test]
async fn super_admin_routes_reject_plain_users() {
    let app = build_app();
    let (_, token) = register(&app, "plain@example.com").await;
    let r = send(&app, Method::GET, "/api/v1/newsletter-subscription", Some(&token), None).await;
    assert_eq!(r.status, StatusCode::UNAUTHORIZED);
    assert_eq!(r.body["message"], "role not authorized!");
}

#[tokio::test]
async fn role_assignment_is_super_admin_only() {
    let app = build_app();
    let (user_id, token) = register(&app, "climber@example.com").await;
    let uri = format!("/api/v1/users/{user_id}/roles/2");
    let r = send(&app, Method::PUT, &uri, Some(&token), None).await;
    assert_eq!(r.status, StatusCode::UNAUTHORIZED);
    assert_eq!(r.body["message"], "role not authorized!");

    let admin = super_admin_token();
    let r = send(&app, Method::PUT, &format!("/api/v1/users/{user_id}/roles/admin"), Some(&admin), None).await;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);
    assert_eq!(r.body["message"], "Failed to parse request body");
    let r = send(&app, Method::PUT, &format!("/api/v1/users/{user_id}/roles/9"), Some(&admin), None).await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
    assert_eq!(r.body["message"], "invalid role");
}

#[tokio::test]
async fn invitation_lifecycle() {
    let app = build_app();
    let (_, owner) = register(&app, "owner@acme.io").await;
    let (_, guest) = register(&app, "guest@acme.io").await;
    let (_, stranger) = register(&app, "stranger@acme.io").await;
    let org_id = create_org(&app, &owner, "hello@acme.io").await;

    // guest is not a member yet
    let r = send(&app, Method::GET, &format!("/api/v1/organisations/{org_id}"), Some(&guest), None).await;
    assert_eq!(r.status, StatusCode::FORBIDDEN);

    let r = send(&app, Method::POST, "/api/v1/invite/create", Some(&stranger), Some(json!({"email": "guest@acme.io", "org_id": org_id}))).await;
    assert_eq!(r.status, StatusCode::FORBIDDEN);
    assert_eq!(r.body["message"], "User is not an admin of the organisation");

    let r = send(&app, Method::POST, "/api/v1/invite/create", Some(&owner), Some(json!({"email": "Guest@Acme.io", "org_id": org_id}))).await;
    assert_eq!(r.status, StatusCode::CREATED);
    assert_eq!(r.body["message"], "Invitation created successfully");
    let link = r.body["data"]["invitation_link"].as_str().unwrap().to_string();
    assert!(link.starts_with("https://portal.test/invite/accept/"));

    let r = send(&app, Method::POST, "/api/v1/invite/accept", Some(&guest), Some(json!({"invitation_link": link}))).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["message"], "Invitation accepted successfully");
    assert_eq!(r.body["data"]["organisation_id"], org_id.as_str());

    let r = send(&app, Method::POST, "/api/v1/invite/accept", Some(&stranger), Some(json!({"invitation_link": link}))).await;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);
    assert_eq!(r.body["message"], "Invitation Link already used");

    let r = send(&app, Method::GET, &format!("/api/v1/organisations/{org_id}"), Some(&guest), None).await;
    assert_eq!(r.status, StatusCode::OK);
    let r = send(&app, Method::GET, &format!("/api/v1/organisations/{org_id}"), Some(&stranger), None).await;
    assert_eq!(r.status, StatusCode::FORBIDDEN);
    assert_eq!(r.body["message"], "user not authorised to retrieve this organisation");
}

#[tokio::test]
async fn accept_can_be_retried_after_membership_write_fails() {
    let orgs = Arc::new(MockOrganisationRepository::default());
    let app = build_app_with(orgs.clone());
    let (_, owner) = register(&app, "retry-owner@acme.io").await;
    let (_, guest) = register(&app, "retry-guest@acme.io").await;
    let org_id = create_org(&app, &owner, "retry@acme.io").await;

    let r = send(&app, Method::POST, "/api/v1/invite/create", Some(&owner), Some(json!({"email": "retry-guest@acme.io", "org_id": org_id}))).await;
    let link = r.body["data"]["invitation_link"].as_str().unwrap().to_string();

    orgs.fail_membership_writes(true);
    let r = send(&app, Method::POST, "/api/v1/invite/accept", Some(&guest), Some(json!({"invitation_link": link}))).await;
    assert_eq!(r.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(r.body["message"], "internal server error");

    orgs.fail_membership_writes(false);
    let r = send(&app, Method::POST, "/api/v1/invite/accept", Some(&guest), Some(json!({"invitation_link": link}))).await;
    assert_eq!(r.status, StatusCode::OK, "{}", r.body);
    let r = send(&app, Method::GET, &format!("/api/v1/organisations/{org_id}"), Some(&guest), None).await;
    assert_eq!(r.status, StatusCode::OK);
}

#[tokio::test]
async fn invitation_input_errors() {
    let app = build_app();
    let (_, owner) = register(&app, "owner2@acme.io").await;
    let org_id = create_org(&app, &owner, "two@acme.io").await;

    let r = send(&app, Method::POST, "/api/v1/invite/create", Some(&owner), Some(json!({"email": "nope", "org_id": org_id}))).await;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);
    assert_eq!(r.body["message"], "Invalid email format");

    let r = send(&app, Method::POST, "/api/v1/invite/create", Some(&owner), Some(json!({"email": "a@b.co", "org_id": "not-a-uuid"}))).await;
    assert_eq!(r.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(r.body["message"], "Invalid Organisation ID");

    let r = send(&app, Method::POST, "/api/v1/invite/accept", Some(&owner), Some(json!({"invitation_link": "https://portal.test/invite/accept/ffff"}))).await;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);
    assert_eq!(r.body["message"], "Invalid or expired invitation link");

    let emails: Vec<String> = (0..4).map(|i| format!("u{i}@acme.io")).collect();
    let r = send(&app, Method::POST, "/api/v1/organization/send-invite", Some(&owner), Some(json!({"emails": emails, "org_id": org_id}))).await;
    assert_eq!(r.status, StatusCode::PAYLOAD_TOO_LARGE);

    let r = send(
        &app,
        Method::POST,
        "/api/v1/organization/send-invite",
        Some(&owner),
        Some(json!({"emails": ["x@acme.io", "bad-address"], "org_id": org_id})),
    )
    .await;
    assert_eq!(r.status, StatusCode::CREATED);
    assert_eq!(r.body["data"]["invitations"].as_array().unwrap().len(), 1);
    assert_eq!(r.body["data"]["invalid_emails"][0], "bad-address");
}

#[tokio::test]
async fn send_invite_is_rate_limited() {
    // 不补充令牌的桶，结果与执行速度无关
    let state = build_state(Arc::new(MockOrganisationRepository::default())).with_invite_limiter(RateLimiter::new(0, 2, true));
    let app = routes::build_router(state, tower_http::cors::CorsLayer::very_permissive());
    let (_, owner) = register(&app, "burst@acme.io").await;
    let org_id = create_org(&app, &owner, "burst-org@acme.io").await;

    // 未认证请求在限流之前被拒绝，不消耗令牌
    let r = send(&app, Method::POST, "/api/v1/organization/send-invite", None, Some(json!({"emails": ["a@acme.io"], "org_id": org_id}))).await;
    assert_eq!(r.status, StatusCode::UNAUTHORIZED);

    for i in 0..2 {
        let body = json!({"emails": [format!("b{i}@acme.io")], "org_id": org_id});
        let r = send(&app, Method::POST, "/api/v1/organization/send-invite", Some(&owner), Some(body)).await;
        assert_eq!(r.status, StatusCode::CREATED);
    }
    let r = send(&app, Method::POST, "/api/v1/organization/send-invite", Some(&owner), Some(json!({"emails": ["c@acme.io"], "org_id": org_id}))).await;
    assert_eq!(r.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(r.body["message"], "Limit exceed");

    // 其他邀请接口不受影响
    let r = send(&app, Method::POST, "/api/v1/invite/create", Some(&owner), Some(json!({"email": "d@acme.io", "org_id": org_id}))).await;
    assert_eq!(r.status, StatusCode::CREATED);
}

#[tokio::test]
async fn role_gate_and_crud() {
    let app = build_app();
    let (_, owner) = register(&app, "roles@acme.io").await;
    let (_, other) = register(&app, "other@acme.io").await;
    let org_id = create_org(&app, &owner, "roles-org@acme.io").await;
    let uri = format!("/api/v1/organisations/{org_id}/roles");

    let r = send(&app, Method::POST, &uri, Some(&other), Some(json!({"name": "auditor"}))).await;
    assert_eq!(r.status, StatusCode::FORBIDDEN);
    assert_eq!(r.body["message"], "not organization owner");

    let missing = format!("/api/v1/organisations/{}/roles", Uuid::new_v4());
    let r = send(&app, Method::POST, &missing, Some(&owner), Some(json!({"name": "auditor"}))).await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
    assert_eq!(r.body["message"], "organisation not found");

    let r = send(&app, Method::POST, &uri, Some(&owner), Some(json!({"name": "auditor", "description": "reads"}))).await;
    assert_eq!(r.status, StatusCode::CREATED);
    assert_eq!(r.body["data"]["message"], "Role created successfully");
    let role_id = r.body["data"]["id"].as_str().unwrap().to_string();

    let r = send(&app, Method::POST, &uri, Some(&owner), Some(json!({"name": "auditor"}))).await;
    assert_eq!(r.status, StatusCode::CONFLICT);

    let perms = format!("{uri}/{role_id}/permissions");
    let r = send(&app, Method::PATCH, &perms, Some(&owner), Some(json!({"category": "tx", "permission_list": {"can_view_transactions": true}}))).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["data"]["permission_list"]["can_view_transactions"], true);

    // 非所有者的修改全部被拒绝
    let role_uri = format!("{uri}/{role_id}");
    let r = send(&app, Method::PATCH, &role_uri, Some(&other), Some(json!({"name": "hijacked"}))).await;
    assert_eq!(r.status, StatusCode::FORBIDDEN);
    assert_eq!(r.body["message"], "not organization owner");
    let r = send(&app, Method::PATCH, &perms, Some(&other), Some(json!({"permission_list": {"can_edit_users": true}}))).await;
    assert_eq!(r.status, StatusCode::FORBIDDEN);
    assert_eq!(r.body["message"], "not organization owner");
    let r = send(&app, Method::DELETE, &role_uri, Some(&other), None).await;
    assert_eq!(r.status, StatusCode::FORBIDDEN);
    assert_eq!(r.body["message"], "not organization owner");

    let r = send(&app, Method::GET, &role_uri, Some(&owner), None).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["data"]["name"], "auditor");
    assert_eq!(r.body["data"]["permissions"]["permission_list"]["can_view_transactions"], true);
    assert!(r.body["data"]["permissions"]["permission_list"].get("can_edit_users").is_none());

    let r = send(&app, Method::DELETE, &role_uri, Some(&owner), None).await;
    assert_eq!(r.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn newsletter_subscription() {
    let app = build_app();
    let r = send(&app, Method::POST, "/api/v1/newsletter-subscription", None, Some(json!({"email": "reader@example.com"}))).await;
    assert_eq!(r.status, StatusCode::CREATED);
    assert_eq!(r.body["message"], "subscribed successfully");

    let r = send(&app, Method::POST, "/api/v1/newsletter-subscription", None, Some(json!({"email": "Reader@Example.com"}))).await;
    assert_eq!(r.status, StatusCode::CONFLICT);
    assert_eq!(r.body["message"], "email already subscribed");

    let r = send(&app, Method::POST, "/api/v1/newsletter-subscription", None, Some(json!({"email": "nope"}))).await;
    assert_eq!(r.status, StatusCode::UNPROCESSABLE_ENTITY);

    let admin = super_admin_token();
    let r = send(&app, Method::GET, "/api/v1/newsletter-subscription?page=1&limit=10", Some(&admin), None).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(r.body["pagination"]["current_page"], 1);
    let id = r.body["data"][0]["id"].as_str().unwrap().to_string();

    let r = send(&app, Method::PATCH, &format!("/api/v1/newsletter-subscription/restore/{id}"), Some(&admin), None).await;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);
    assert_eq!(r.body["message"], "newsletter email is not soft-deleted");

    let r = send(&app, Method::DELETE, &format!("/api/v1/newsletter-subscription/{id}"), Some(&admin), None).await;
    assert_eq!(r.status, StatusCode::OK);
    let r = send(&app, Method::GET, "/api/v1/newsletter-subscription/deleted", Some(&admin), None).await;
    assert_eq!(r.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn metrics_endpoint_is_exposed() {
    let app = build_app();
    send(&app, Method::GET, "/health", None, None).await;
    let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(resp.into_body().collect().await.unwrap().to_bytes().to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
}
