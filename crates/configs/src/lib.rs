use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub app: AppSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8019, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    /// 启动时自动执行数据库迁移
    #[serde(default = "default_true")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            auto_migrate: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: String::new(), token_ttl_hours: default_token_ttl() }
    }
}

/// Application-level settings (invitation links, limits)
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_invitation_ttl")]
    pub invitation_ttl_hours: i64,
    #[serde(default = "default_max_invites")]
    pub max_invites_per_request: usize,
    /// send-invite 令牌桶：每秒补充数
    #[serde(default = "default_invite_rate")]
    pub invite_rate_per_second: u64,
    #[serde(default = "default_invite_burst")]
    pub invite_burst: u64,
    #[serde(default = "default_true")]
    pub invite_rate_limit_enabled: bool,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            invitation_ttl_hours: default_invitation_ttl(),
            max_invites_per_request: default_max_invites(),
            invite_rate_per_second: default_invite_rate(),
            invite_burst: default_invite_burst(),
            invite_rate_limit_enabled: true,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_true() -> bool { true }
fn default_token_ttl() -> i64 { 24 }
fn default_invitation_ttl() -> i64 { 24 }
fn default_max_invites() -> usize { 5 }
fn default_invite_rate() -> u64 { 1 }
fn default_invite_burst() -> u64 { 4 }

pub const DEFAULT_BASE_URL: &str = "http://localhost:8019";
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// 配置文件缺失时，完全由环境变量构建
    pub fn from_env() -> Result<Self> {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize()?;
        // 归一化 database（支持从环境变量填充 URL）
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.app.normalize_from_env()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port 必须在 1..=65535 范围内"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let mut cfg = DatabaseConfig::default();
        cfg.normalize_from_env();
        cfg
    }

    pub fn normalize_from_env(&mut self) {
        // 若 TOML 中未提供 URL，则尝试从环境变量填充
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url 为空；请在 config.toml 或环境变量 DATABASE_URL 中提供"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url 必须以 postgresql:// 或 postgres:// 开头"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections 必须 >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections 必须 >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database 超时配置必须为正整数秒"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            self.jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string());
        }
        if self.token_ttl_hours <= 0 {
            self.token_ttl_hours = default_token_ttl();
        }
    }
}

impl AppSection {
    pub fn normalize_from_env(&mut self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            self.base_url = std::env::var("APP_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        }
        // 去掉末尾斜杠，拼接邀请链接时不会出现 //
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        if self.invitation_ttl_hours <= 0 {
            return Err(anyhow!("app.invitation_ttl_hours 必须为正数"));
        }
        if self.max_invites_per_request == 0 {
            return Err(anyhow!("app.max_invites_per_request 必须 >= 1"));
        }
        if self.invite_rate_limit_enabled && self.invite_burst == 0 {
            return Err(anyhow!("app.invite_burst 必须 >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml_with_defaults() {
        let cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [database]
            url = "postgres://u:p@localhost/db"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.database.max_connections, 10);
        assert!(cfg.database.auto_migrate);
        assert_eq!(cfg.app.invitation_ttl_hours, 24);
        assert_eq!(cfg.app.max_invites_per_request, 5);
        assert_eq!(cfg.app.invite_rate_per_second, 1);
        assert_eq!(cfg.app.invite_burst, 4);
        assert!(cfg.app.invite_rate_limit_enabled);
    }

    #[test]
    fn rejects_non_postgres_url() {
        let db = DatabaseConfig { url: "mysql://localhost/db".into(), ..DatabaseConfig::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let mut app = AppSection { base_url: "https://example.com//".into(), ..AppSection::default() };
        app.normalize_from_env().unwrap();
        assert_eq!(app.base_url, "https://example.com");
    }

    #[test]
    fn zero_invite_limit_is_rejected() {
        let mut app = AppSection { base_url: "https://example.com".into(), max_invites_per_request: 0, ..AppSection::default() };
        assert!(app.normalize_from_env().is_err());
    }
}
