use axum::{
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

/// Track request rates per IP address using sliding window
#[derive(Clone)]
struct RateLimiter {
    /// Map of IP -> list of request timestamps
    requests: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
    /// Last cleanup time
    last_cleanup: Arc<Mutex<Instant>>,
    /// Cleanup interval in seconds
    cleanup_interval: u64,
}

impl RateLimiter {
    fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(HashMap::new())),
            last_cleanup: Arc::new(Mutex::new(Instant::now())),
            cleanup_interval: 60,
        }
    }

    /// Check if request is allowed under rate limit
    ///
    /// # Arguments
    ///
    /// * `ip` - Client IP address
    /// * `limit` - Maximum requests allowed in window
    /// * `window` - Time window
    ///
    /// # Returns
    ///
    /// True if request is allowed, False if rate limit exceeded
    async fn is_allowed(&self, ip: IpAddr, limit: usize, window: Duration) -> bool {
        let now = Instant::now();
        let cutoff = now - window;

        let mut requests = self.requests.lock().await;
        let timestamps = requests.entry(ip).or_default();

        timestamps.retain(|&ts| ts > cutoff);

        if timestamps.len() >= limit {
            return false;
        }

        timestamps.push(now);
        true
    }

    /// Remove stale IP entries to prevent memory leaks
    async fn cleanup_old_entries(&self) {
        let now = Instant::now();

        let mut last_cleanup = self.last_cleanup.lock().await;
        if now.duration_since(*last_cleanup) < Duration::from_secs(self.cleanup_interval) {
            return;
        }

        let cutoff = now - Duration::from_secs(60);
        let mut requests = self.requests.lock().await;
        requests.retain(|_, timestamps| timestamps.iter().any(|&ts| ts >= cutoff));

        *last_cleanup = now;
    }
}

/// Get rate limit for endpoint
///
/// # Arguments
///
/// * `path` - Request path
///
/// # Returns
///
/// Requests per second limit, or None to skip rate limiting
fn get_rate_limit(path: &str) -> Option<usize> {
    // Long-lived socket, opened once per page load
    if path.starts_with("/ws") {
        return None;
    }

    // Credential checks are expensive and a guessing target
    if matches!(path, "/user/signup" | "/user/login" | "/user/reLogin") {
        return Some(5);
    }

    // Clients poll status on every page
    if path == "/user/status" {
        return Some(20);
    }

    if path.starts_with("/user") {
        return Some(10);
    }

    if path == "/health" {
        return Some(10);
    }

    Some(50)
}

/// Global rate limiter instance
static RATE_LIMITER: once_cell::sync::Lazy<RateLimiter> =
    once_cell::sync::Lazy::new(RateLimiter::new);

/// Axum middleware to enforce rate limits per IP address
///
/// Requests without connection info (in-process test clients) are not
/// limited; the server attaches it via `into_make_service_with_connect_info`.
pub async fn rate_limit_middleware(req: Request, next: Next) -> Result<Response, StatusCode> {
    let ip = match req.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => addr.ip(),
        None => return Ok(next.run(req).await),
    };

    let limit = match get_rate_limit(req.uri().path()) {
        Some(l) => l,
        None => return Ok(next.run(req).await),
    };

    if !RATE_LIMITER
        .is_allowed(ip, limit, Duration::from_secs(1))
        .await
    {
        tracing::warn!("Rate limit exceeded for ip={} path={}", ip, req.uri().path());
        let response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "rate_limited",
                "message": "Rate limit exceeded. Please try again later."
            })),
        );
        return Ok(response.into_response());
    }

    RATE_LIMITER.cleanup_old_entries().await;

    Ok(next.run(req).await)
}
