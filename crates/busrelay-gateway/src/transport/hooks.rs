//! Request lifecycle hooks.
//!
//! On arrival the request is stamped with a [`RequestTiming`] in its
//! extensions. On completion the stamp is read back and the request is
//! reported through `track_request`. Both run inside one middleware future,
//! so completion fires exactly once, after the handler produced a response.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;
use crate::context::{RequestDescriptor, RequestTiming};
use crate::obs::TelemetryClient;

/// Stamp the request and capture its descriptor.
pub fn on_arrival(req: &mut Request) -> RequestDescriptor {
    req.extensions_mut().insert(RequestTiming::start());
    RequestDescriptor::from_request(req)
}

/// Report a completed request. A missing stamp counts as zero elapsed.
pub fn on_completion(
    telemetry: &TelemetryClient,
    req: &RequestDescriptor,
    timing: Option<RequestTiming>,
    status: StatusCode,
) {
    let elapsed_ms = timing.map(|t| t.elapsed_ms()).unwrap_or(0.0);
    telemetry.track_request(req, elapsed_ms, status.as_u16());
}

pub async fn track_requests(State(app): State<AppState>, mut req: Request, next: Next) -> Response {
    let descriptor = on_arrival(&mut req);
    let timing = req.extensions().get::<RequestTiming>().copied();

    let response = next.run(req).await;

    on_completion(&app.telemetry(), &descriptor, timing, response.status());
    response
}
