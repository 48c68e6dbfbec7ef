use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::http::header::CONTENT_LENGTH;

/// Arrival stamp stored in the request's extensions.
#[derive(Debug, Clone, Copy)]
pub struct RequestTiming {
    started: Instant,
}

impl RequestTiming {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

/// What the observability client needs to know about a finished request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: String,
    /// Matched route template; `None` when no route matched.
    pub route: Option<String>,
    /// Raw `content-length` header, unparsed.
    pub content_length: Option<String>,
}

impl RequestDescriptor {
    pub fn from_request(req: &Request) -> Self {
        Self {
            method: req.method().as_str().to_string(),
            route: req
                .extensions()
                .get::<MatchedPath>()
                .map(|p| p.as_str().to_string()),
            content_length: req
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }

    pub fn route_or_unknown(&self) -> &str {
        self.route.as_deref().unwrap_or("unknown")
    }

    /// Declared payload size; 0 when absent or unparsable.
    pub fn payload_size(&self) -> f64 {
        self.content_length
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}
