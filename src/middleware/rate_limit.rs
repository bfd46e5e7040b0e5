// SPDX-License-Identifier: MIT

//! Best-effort sliding-window rate limiting keyed by client address.
//!
//! The limiter is an injected component on `AppState` rather than a process
//! global, so tests can construct one with their own thresholds. Per-key
//! timestamp windows are pruned lazily on each check.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default request budget per client address per window.
pub const MAX_REQUESTS_PER_WINDOW: usize = 100;
/// Default rolling window length.
pub const WINDOW_SECS: u64 = 60;

/// Sliding-window request counter.
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: usize,
    window_millis: u64,
    hits: Arc<DashMap<String, Vec<u64>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_millis: window_secs * 1000,
            hits: Arc::new(DashMap::new()),
        }
    }

    /// Record a request for `key` and report whether it is within budget.
    pub fn check(&self, key: &str) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.check_at(key, now)
    }

    /// `check` with an explicit clock, for tests.
    fn check_at(&self, key: &str, now_millis: u64) -> bool {
        let cutoff = now_millis.saturating_sub(self.window_millis);

        let mut window = self.hits.entry(key.to_string()).or_default();
        window.retain(|&t| t > cutoff);

        if window.len() >= self.max_requests {
            return false;
        }

        window.push(now_millis);
        true
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(MAX_REQUESTS_PER_WINDOW, WINDOW_SECS)
    }
}

/// Best-effort client key: proxy header first, then socket address.
fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware that rejects clients exceeding the request budget.
pub async fn enforce_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request);

    if !state.rate_limiter.check(&key) {
        tracing::warn!(client = %key, "Rate limit exceeded");
        return Err(AppError::RateLimited);
    }

    Ok(next.run(request).await)
}
