//! Fixed-window request rate limiting, keyed by client IP.
//!
//! Sixty requests per five-minute window. The key is the first hop of
//! `X-Forwarded-For` when present, otherwise the socket address, otherwise
//! a shared bucket.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;

use crate::http::error::AppError;
use crate::state::AppState;

const WINDOW: Duration = Duration::from_secs(5 * 60);
const LIMIT: u32 = 60;

/// Per-key fixed request windows.
pub struct RateLimiter {
    windows: DashMap<String, (Instant, u32)>,
    window: Duration,
    limit: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, limit: u32) -> Self {
        Self {
            windows: DashMap::new(),
            window,
            limit,
        }
    }

    /// Record one request for `key`; `false` when the window is exhausted.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        // Drop expired windows so unique keys cannot grow the map forever.
        self.windows
            .retain(|_, (started, _)| now.duration_since(*started) < self.window);
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert((now, 0));
        let (started, count) = *entry;
        if now.duration_since(started) >= self.window {
            *entry = (now, 1);
            return true;
        }
        if count >= self.limit {
            return false;
        }
        *entry = (started, count + 1);
        true
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(WINDOW, LIMIT)
    }
}

/// Axum middleware enforcing the limit on the wrapped routes.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request);
    if !state.rate_limiter.check(&key) {
        tracing::warn!(client = %key, "rate limit exceeded");
        return Err(AppError::RateLimited);
    }
    Ok(next.run(request).await)
}

fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
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
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
