//! End-to-end flow against a real Postgres; skipped with SKIP_DB_TESTS.

use configs::{AppConfig, DatabaseConfig};
use migration::MigratorTrait;
use serde_json::{json, Value};
use uuid::Uuid;

async fn spawn_app() -> anyhow::Result<String> {
    let mut cfg = AppConfig::default();
    cfg.database = configs::load_default().map(|c| c.database).unwrap_or_else(|_| DatabaseConfig::from_env());
    cfg.auth.jwt_secret = "e2e-secret".into();
    cfg.app.base_url = "http://portal.e2e".into();
    cfg.normalize_and_validate()?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;
    let app = server::startup::build_app(db, &cfg);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}/api/v1"))
}

async fn post(client: &reqwest::Client, url: String, token: Option<&str>, body: Value) -> anyhow::Result<(u16, Value)> {
    let mut req = client.post(url).json(&body);
    if let Some(t) = token {
        req = req.bearer_auth(t);
    }
    let resp = req.send().await?;
    let status = resp.status().as_u16();
    Ok((status, resp.json().await?))
}

async fn register(client: &reqwest::Client, base: &str, email: &str) -> anyhow::Result<String> {
    let (status, body) = post(
        client,
        format!("{base}/auth/register"),
        None,
        json!({"first_name": "E2E", "last_name": "User", "email": email, "password": "Passw0rd!"}),
    )
    .await?;
    assert_eq!(status, 201, "{body}");
    Ok(body["data"]["access_token"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn register_create_org_invite_and_accept() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let base = spawn_app().await?;
    let client = reqwest::Client::new();
    let run = Uuid::new_v4().simple().to_string();

    let owner = register(&client, &base, &format!("owner-{run}@e2e.io")).await?;
    let guest_email = format!("guest-{run}@e2e.io");
    let guest = register(&client, &base, &guest_email).await?;

    let (status, org) = post(
        &client,
        format!("{base}/organisations"),
        Some(&owner),
        json!({"name": "E2E Org", "email": format!("org-{run}@e2e.io"), "type": "test"}),
    )
    .await?;
    assert_eq!(status, 201, "{org}");
    let org_id = org["data"]["id"].as_str().unwrap_or_default().to_string();

    let (status, invite) = post(
        &client,
        format!("{base}/invite/create"),
        Some(&owner),
        json!({"email": guest_email, "org_id": org_id}),
    )
    .await?;
    assert_eq!(status, 201, "{invite}");
    let link = invite["data"]["invitation_link"].as_str().unwrap_or_default().to_string();
    assert!(link.starts_with("http://portal.e2e/invite/accept/"));

    let (status, accepted) = post(&client, format!("{base}/invite/accept"), Some(&guest), json!({"invitation_link": link})).await?;
    assert_eq!(status, 200, "{accepted}");
    assert_eq!(accepted["data"]["organisation_id"], org_id.as_str());

    let (status, again) = post(&client, format!("{base}/invite/accept"), Some(&guest), json!({"invitation_link": link})).await?;
    assert_eq!(status, 400);
    assert_eq!(again["message"], "Invitation Link already used");

    let resp = client.get(format!("{base}/organisations/{org_id}")).bearer_auth(&guest).send().await?;
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client.get(format!("{base}/notifications")).bearer_auth(&guest).send().await?;
    assert_eq!(resp.status().as_u16(), 200);
    Ok(())
}

#[tokio::test]
async fn faq_is_public_to_read_but_admin_only_to_write() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let base = spawn_app().await?;
    let client = reqwest::Client::new();
    let run = Uuid::new_v4().simple().to_string();

    let resp = client.get(format!("{base}/faq")).send().await?;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await?;
    assert!(body["pagination"].is_object());

    let user = register(&client, &base, &format!("faq-{run}@e2e.io")).await?;
    let (status, body) = post(
        &client,
        format!("{base}/faq"),
        Some(&user),
        json!({"question": "Who can write?", "answer": "Admins", "category": "general"}),
    )
    .await?;
    assert_eq!(status, 401);
    assert_eq!(body["message"], "role not authorized!");
    Ok(())
}
