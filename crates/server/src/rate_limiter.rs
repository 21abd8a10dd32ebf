//! Token-bucket limiter guarding the bulk invitation endpoint.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::ApiError;
use crate::routes::auth::ServerState;

pub const LIMIT_EXCEEDED: &str = "Limit exceed";

#[derive(Debug)]
pub struct TokenBucket {
    capacity: u64,
    tokens: u64,
    refill_rate: u64, // tokens per second
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(capacity: u64, refill_rate: u64) -> Self {
        Self { capacity, tokens: capacity, refill_rate, last_refill: Instant::now() }
    }

    pub fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens > 0 {
            self.tokens -= 1;
            debug!(remaining = self.tokens, "rate_limit_token_acquired");
            true
        } else {
            false
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let tokens_to_add = (now.duration_since(self.last_refill).as_secs_f64() * self.refill_rate as f64) as u64;
        if tokens_to_add > 0 {
            self.tokens = (self.tokens + tokens_to_add).min(self.capacity);
            self.last_refill = now;
        }
    }
}

/// Shared limiter; one bucket for every caller of the guarded route.
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(requests_per_second: u64, burst_size: u64, enabled: bool) -> Self {
        Self { bucket: Arc::new(Mutex::new(TokenBucket::new(burst_size, requests_per_second))), enabled }
    }

    pub fn from_config(app: &configs::AppSection) -> Self {
        Self::new(app.invite_rate_per_second, app.invite_burst, app.invite_rate_limit_enabled)
    }

    pub async fn check_rate_limit(&self) -> bool {
        if !self.enabled {
            return true;
        }
        self.bucket.lock().await.try_acquire()
    }
}

impl Default for RateLimiter {
    /// One request per second with a burst of four.
    fn default() -> Self {
        Self::new(1, 4, true)
    }
}

/// 429 once the send-invite bucket is empty
pub async fn limit_send_invites(State(state): State<ServerState>, req: Request, next: Next) -> Result<Response, ApiError> {
    if !state.invite_limiter.check_rate_limit().await {
        warn!(path = %req.uri().path(), "rate_limit_exceeded");
        return Err(ApiError::new(StatusCode::TOO_MANY_REQUESTS, LIMIT_EXCEEDED));
    }
    Ok(next.run(req).await)
}
