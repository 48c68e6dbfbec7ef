//! Axum router wiring.
//!
//! Event routes plus liveness/readiness, all wrapped by the request hooks.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::{app_state::AppState, ops, services, transport};

pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/receive-event", post(services::receive_event))
        .route("/send-event", post(services::send_event))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz));
    instrument(routes, state)
}

/// Wraps `routes` in the request hooks. A panicking handler becomes a 500
/// before the hooks see it, so it is still counted as a 5xx.
pub fn instrument(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            transport::hooks::track_requests,
        ))
        .with_state(state)
}
