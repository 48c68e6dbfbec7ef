//! Receive-and-echo and validate-and-forward handlers.

use std::time::Instant;

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::{json, Value};

use busrelay_core::error::RelayError;
use busrelay_core::event::EventEnvelope;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::obs::BusOperation;

/// Body of the 500 returned when the bus submission fails.
pub const SEND_FAILED_MESSAGE: &str = "Failed to send event";

/// Echo any body back with 200. Bodies that are not JSON are still accepted
/// and echoed byte for byte.
pub async fn receive_event(State(app): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let event = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    let telemetry = app.telemetry();
    telemetry.info("Event received from EventBridge", Some(json!({ "event": event })));
    telemetry.track_eventbridge_operation(BusOperation::Receive, true, None);

    let content_type = headers
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    (StatusCode::OK, [(CONTENT_TYPE, content_type)], body).into_response()
}

/// Shape the body into one bus entry and submit it.
///
/// 204 on success; bus failures are absorbed into a fixed 500 body. Only an
/// unparsable body escapes as an [`ApiError`] (400).
pub async fn send_event(State(app): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| RelayError::BadRequest(format!("invalid json body: {e}")))?;
    let entry = EventEnvelope::from_json(&value).into_entry(&app.cfg().bus.bus_name)?;

    let telemetry = app.telemetry();
    let started = Instant::now();
    let result = app.bus().put_event(entry).await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(receipt) => {
            telemetry.info(
                "Event sent to EventBridge",
                Some(json!({
                    "eventId": receipt.event_id,
                    "failedEntryCount": receipt.failed_entry_count,
                })),
            );
            if receipt.failed_entry_count > 0 {
                telemetry.warn(
                    "EventBridge reported failed entries",
                    Some(json!({ "failedEntryCount": receipt.failed_entry_count })),
                );
            }
            telemetry.track_eventbridge_operation(BusOperation::Send, true, Some(elapsed_ms));
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Err(e) => {
            telemetry.error(
                "Failed to send event to EventBridge",
                Some(json!({ "error": error_message(&e) })),
            );
            telemetry.track_eventbridge_operation(BusOperation::Send, false, Some(elapsed_ms));
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": SEND_FAILED_MESSAGE })),
            )
                .into_response())
        }
    }
}

fn error_message(e: &RelayError) -> String {
    match e {
        RelayError::Bus(msg) if !msg.trim().is_empty() => msg.clone(),
        RelayError::Bus(_) => "Unknown error".to_string(),
        other => other.to_string(),
    }
}
