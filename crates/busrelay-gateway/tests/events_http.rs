//! HTTP-level behavior of the event routes, driven in-process.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod support;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use busrelay_gateway::app_state::{AppState, Phase};
use busrelay_gateway::router::{build_router, instrument};

use support::{
    config_with, drain, expect_record, harness, harness_with, spawn_intake, Harness, StubBus,
    PREFIX,
};

async fn call(state: &AppState, method: Method, uri: &str, body: &str) -> Response {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body.to_string()))
        .unwrap();
    build_router(state.clone()).oneshot(req).await.unwrap()
}

async fn body_bytes(resp: Response) -> Vec<u8> {
    to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()
}

#[tokio::test]
async fn send_event_forwards_entry_and_returns_204() {
    let h = harness(StubBus::healthy());
    let body = json!({ "detail": { "id": 1 }, "detailType": "Order", "source": "svc" }).to_string();

    let resp = call(&h.state, Method::POST, "/send-event", &body).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let entries = h.bus.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].event_bus_name, "orders");
    assert_eq!(entries[0].source, "svc");
    assert_eq!(entries[0].detail_type, "Order");
    assert_eq!(entries[0].detail.as_deref(), Some(r#"{"id":1}"#));

    let sent = h.sink.named(PREFIX, "eventbridge.send.count");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].tag("success"), Some("true"));
    let timing = h.sink.named(PREFIX, "eventbridge.send.duration");
    assert_eq!(timing.len(), 1);
    assert!(timing[0].value >= 0.0);
    assert!(h.sink.named(PREFIX, "eventbridge.send.error").is_empty());
}

#[tokio::test]
async fn send_event_applies_fallbacks() {
    let h = harness(StubBus::healthy());

    let resp = call(&h.state, Method::POST, "/send-event", r#"{"detail":{"k":"v"}}"#).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let entries = h.bus.entries();
    assert_eq!(entries[0].detail_type, "CustomEvent");
    assert_eq!(entries[0].source, "custom.app");
}

#[tokio::test]
async fn send_event_failure_is_absorbed_as_500() {
    let h = harness(StubBus::failing());
    let body = json!({ "detail": {}, "detailType": "Order", "source": "svc" }).to_string();

    let resp = call(&h.state, Method::POST, "/send-event", &body).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let v: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(v, json!({ "error": "Failed to send event" }));

    let sent = h.sink.named(PREFIX, "eventbridge.send.count");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].tag("success"), Some("false"));
    assert_eq!(h.sink.named(PREFIX, "eventbridge.send.error").len(), 1);
    let timing = h.sink.named(PREFIX, "eventbridge.send.duration");
    assert!(timing.iter().all(|m| m.value >= 0.0));

    assert_eq!(h.sink.named(PREFIX, "request.error.5xx").len(), 1);
    assert!(h.sink.named(PREFIX, "request.success").is_empty());
}

fn shipping_harness(url: &str, bus: std::sync::Arc<StubBus>) -> Harness {
    let cfg = config_with(&[
        ("EVENT_BUS_NAME", "orders"),
        ("DD_API_KEY", "secret"),
        ("DD_LOGS_URL", url),
    ]);
    harness_with(cfg, bus)
}

#[tokio::test]
async fn send_failure_log_reaches_the_intake() {
    let (url, mut intake) = spawn_intake().await;
    let h = shipping_harness(&url, StubBus::failing());

    let resp = call(&h.state, Method::POST, "/send-event", r#"{"detail":{}}"#).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let captured = expect_record(&mut intake, "Failed to send event to EventBridge").await;
    assert!(captured.contains("AccessDeniedException: not authorized"), "{captured}");
    assert!(captured.contains(r#""level":"error""#), "{captured}");
}

#[tokio::test]
async fn empty_bus_error_is_logged_as_unknown() {
    let (url, mut intake) = spawn_intake().await;
    let h = shipping_harness(&url, StubBus::failing_with(""));

    let resp = call(&h.state, Method::POST, "/send-event", r#"{"detail":{}}"#).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let captured = expect_record(&mut intake, "Failed to send event to EventBridge").await;
    assert!(captured.contains(r#""error":"Unknown error""#), "{captured}");
}

#[tokio::test]
async fn successful_send_ships_no_failure_log() {
    let (url, mut intake) = spawn_intake().await;
    let h = shipping_harness(&url, StubBus::healthy());

    let resp = call(&h.state, Method::POST, "/send-event", r#"{"detail":{}}"#).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    for captured in drain(&mut intake) {
        assert!(!captured.contains("Failed to send event"), "{captured}");
    }
}

#[tokio::test]
async fn panicking_handler_is_tracked_as_5xx() {
    async fn boom() -> &'static str {
        panic!("handler blew up")
    }

    let h = harness(StubBus::healthy());
    let app = instrument(Router::new().route("/boom", get(boom)), h.state.clone());
    let req = Request::builder().uri("/boom").body(Body::empty()).unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let counts = h.sink.named(PREFIX, "request.count");
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].tag("route"), Some("/boom"));
    assert_eq!(counts[0].tag("status"), Some("500"));
    assert_eq!(h.sink.named(PREFIX, "request.error.5xx").len(), 1);
}

#[tokio::test]
async fn send_event_rejects_unparsable_body_without_calling_bus() {
    let h = harness(StubBus::healthy());

    let resp = call(&h.state, Method::POST, "/send-event", "{not json").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(v["error"], "BAD_REQUEST");

    assert!(h.bus.entries().is_empty());
    assert!(h.sink.named(PREFIX, "eventbridge.send.count").is_empty());
    assert_eq!(h.sink.named(PREFIX, "request.error.4xx").len(), 1);
}

#[tokio::test]
async fn receive_event_echoes_body() {
    let h = harness(StubBus::healthy());
    let body = r#"{"version":"0","detail-type":"Order","detail":{"id":7}}"#;

    let resp = call(&h.state, Method::POST, "/receive-event", body).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(body_bytes(resp).await, body.as_bytes());

    let received = h.sink.named(PREFIX, "eventbridge.receive.count");
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].tag("operation"), Some("receive"));
    assert_eq!(received[0].tag("success"), Some("true"));
    assert!(h.sink.named(PREFIX, "eventbridge.receive.duration").is_empty());
    assert!(h.bus.entries().is_empty());
}

#[tokio::test]
async fn receive_event_accepts_malformed_and_empty_bodies() {
    let h = harness(StubBus::healthy());

    for body in ["{broken", ""] {
        let resp = call(&h.state, Method::POST, "/receive-event", body).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_bytes(resp).await, body.as_bytes());
    }
    assert_eq!(h.sink.named(PREFIX, "eventbridge.receive.count").len(), 2);
}

#[tokio::test]
async fn every_request_is_tracked_once_with_route_tags() {
    let h = harness(StubBus::healthy());
    let body = r#"{"detail":{}}"#;

    let _ = call(&h.state, Method::POST, "/send-event", body).await;

    let counts = h.sink.named(PREFIX, "request.count");
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].tag("method"), Some("POST"));
    assert_eq!(counts[0].tag("route"), Some("/send-event"));
    assert_eq!(counts[0].tag("status"), Some("204"));
    assert_eq!(h.sink.named(PREFIX, "request.duration").len(), 1);

    let size = h.sink.named(PREFIX, "request.size");
    assert_eq!(size.len(), 1);
    assert_eq!(size[0].value, body.len() as f64);
    assert_eq!(h.sink.named(PREFIX, "request.success").len(), 1);
}

#[tokio::test]
async fn unmatched_route_is_tracked_as_unknown() {
    let h = harness(StubBus::healthy());

    let resp = call(&h.state, Method::GET, "/nope", "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let counts = h.sink.named(PREFIX, "request.count");
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].tag("route"), Some("unknown"));
    assert_eq!(h.sink.named(PREFIX, "request.error.4xx").len(), 1);
}

#[tokio::test]
async fn readiness_flips_when_draining() {
    let h = harness(StubBus::healthy());

    let resp = call(&h.state, Method::GET, "/healthz", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call(&h.state, Method::GET, "/readyz", "").await;
    assert_eq!(resp.status(), StatusCode::OK);

    h.state.set_phase(Phase::ShuttingDown);
    let resp = call(&h.state, Method::GET, "/readyz", "").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_bytes(resp).await, b"draining");
}

#[tokio::test]
async fn metrics_carry_prefix_and_global_tags() {
    let h = harness(StubBus::healthy());
    let _ = call(&h.state, Method::GET, "/healthz", "").await;

    let lines = h.sink.lines();
    assert!(!lines.is_empty());
    for line in lines {
        assert!(line.starts_with(PREFIX), "{line}");
        assert!(line.contains("|#env:development,service:eventbridge-api"), "{line}");
    }
}
