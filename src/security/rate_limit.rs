//! Rolling-window rate limiting middleware.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Source of "now" for the limiter. Injectable so tests can advance time
/// deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Per-client rolling-window admission control.
///
/// Each client identifier maps to the ordered timestamps of its recent
/// requests. On every call the window is filtered to the trailing interval,
/// the current instant appended, and the request admitted iff the resulting
/// count stays within the limit. State decays naturally as entries age out;
/// there is no reset operation.
pub struct RateLimiter {
    windows: DashMap<String, Vec<Instant>>,
    window: Duration,
    max_requests: usize,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
            clock,
        }
    }

    /// Admit or reject one request from `client_id`.
    ///
    /// The filter-then-append sequence runs under the per-key entry guard, so
    /// concurrent requests from the same client cannot interleave between the
    /// two steps.
    pub fn admit(&self, client_id: &str) -> bool {
        let now = self.clock.now();
        let mut window = self.windows.entry(client_id.to_string()).or_default();
        window.retain(|t| now.duration_since(*t) < self.window);
        window.push(now);
        window.len() <= self.max_requests
    }

    /// Drop clients whose every timestamp has aged out of the window.
    ///
    /// The client map is unbounded by contract; this sweep is an optional
    /// hygiene pass that does not change per-key admission behavior.
    pub fn sweep_idle(&self) {
        let now = self.clock.now();
        self.windows
            .retain(|_, window| window.iter().any(|t| now.duration_since(*t) < self.window));
    }

    /// Number of client identifiers currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Derive the client identifier for admission control: the first entry of
/// `x-forwarded-for` when present, else the socket peer address.
pub fn client_key(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

/// Middleware function applying admission control to every route.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(request.headers(), addr);

    if limiter.admit(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, "Rate limit exceeded");
        metrics::record_rate_limited();
        (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response()
    }
}
