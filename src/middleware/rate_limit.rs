use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

const WINDOW: Duration = Duration::from_secs(1);

/// Requests admitted since `opened`.
struct Window {
    opened: Instant,
    admitted: u32,
}

impl Window {
    fn admit(&mut self, at: Instant, limit: u32) -> bool {
        if at.duration_since(self.opened) >= WINDOW {
            self.opened = at;
            self.admitted = 0;
        }
        let open = self.admitted < limit;
        if open {
            self.admitted += 1;
        }
        open
    }
}

/// Fixed one-second window shared by every request of one router group.
#[derive(Clone)]
pub struct RateLimiter {
    group: &'static str,
    limit: u32,
    window: Arc<Mutex<Window>>,
}

impl RateLimiter {
    pub fn new(group: &'static str, rps: u32) -> Self {
        Self {
            group,
            limit: rps.max(1),
            window: Arc::new(Mutex::new(Window {
                opened: Instant::now(),
                admitted: 0,
            })),
        }
    }

    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    fn allow_at(&self, at: Instant) -> bool {
        self.window
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .admit(at, self.limit)
    }
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if limiter.allow() {
        return next.run(req).await;
    }
    tracing::warn!(
        group = limiter.group,
        limit = limiter.limit,
        path = %req.uri().path(),
        "Rate limit exceeded"
    );
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({"error": "rate_limit_exceeded"})),
    )
        .into_response()
}
