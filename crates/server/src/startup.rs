use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::rate_limiter::RateLimiter;
use crate::routes::{self, auth};
use service::invitation::InvitationConfig;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// config.toml 优先；文件缺失或无效时完全由环境变量构建
fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            warn!(error = %e, "config.toml unavailable, falling back to environment");
            AppConfig::from_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
        }
    }
}

/// Build the router for an already connected database and loaded config.
pub fn build_app(db: sea_orm::DatabaseConnection, cfg: &AppConfig) -> Router {
    let repos = auth::Repos::seaorm(&db);
    let state = auth::ServerState::new(
        db,
        auth::ServerAuthConfig { jwt_secret: cfg.auth.jwt_secret.clone(), token_ttl_hours: cfg.auth.token_ttl_hours },
        InvitationConfig::from(&cfg.app),
        repos,
    )
    .with_invite_limiter(RateLimiter::from_config(&cfg.app));
    routes::build_router(state, build_cors())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(service = "server", event = "graceful_shutdown", "ctrl_c received, draining connections");
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let cfg = load_config()?;
    if cfg.auth.jwt_secret == configs::DEV_JWT_SECRET {
        warn!("JWT_SECRET not set; using the development secret");
    }

    // DB connection
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.auto_migrate {
        migration::Migrator::up(&db, None).await?;
        info!(service = "server", event = "migrated", "database migrations applied");
    }

    let app = build_app(db, &cfg);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, base_url = %cfg.app.base_url, "starting server crate");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
