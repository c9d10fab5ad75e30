use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tracing::warn;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Sliding-window limiter keyed by caller address
pub struct RateLimiter {
    max_attempts: usize,
    window: Duration,
    attempts: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(api: &ApiConfig) -> Self {
        Self::new(
            api.auth_rate_limit_attempts as usize,
            Duration::from_secs(api.auth_rate_limit_window_secs),
        )
    }

    /// Record an attempt for `key`. Returns false once the window is full;
    /// rejected attempts are not recorded.
    pub async fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now()).await
    }

    async fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut lock = self.attempts.lock().await;
        lock.retain(|_, window| {
            while window
                .front()
                .is_some_and(|oldest| now.duration_since(*oldest) >= self.window)
            {
                window.pop_front();
            }
            !window.is_empty()
        });

        let window = lock.entry(key.to_string()).or_default();
        if window.len() >= self.max_attempts {
            return false;
        }
        window.push_back(now);
        true
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.attempts.lock().await.len()
    }
}

/// Peer address of the connection. The first `X-Forwarded-For` entry is
/// used instead only when `trust_forwarded` is set.
fn client_key(request: &Request, trust_forwarded: bool) -> String {
    let forwarded = trust_forwarded
        .then(|| request.headers().get("x-forwarded-for"))
        .flatten()
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Applied to login and register, before the credential store is touched
pub async fn auth_rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.config.api.enable_rate_limiting {
        let key = client_key(&request, state.config.api.trust_proxy_headers);
        if !state.rate_limiter.allow(&key).await {
            warn!("Auth rate limit exceeded for {}", key);
            return Err(ApiError::too_many_requests(
                "Too many authentication attempts, please try again later",
            ));
        }
    }
    Ok(next.run(request).await)
}
