//! Event Envelope (`{ detail, detailType, source }`) and bus entry shaping.
//!
//! Only presence is checked. `detailType` and `source` fall back to fixed
//! strings when absent, empty, or not a string; `detail` is carried verbatim
//! (an explicit `null` included) and serialized to a JSON string for the bus.

use serde::Serialize;
use serde_json::Value;

use crate::error::{RelayError, Result};

/// Used when the body has no usable `detailType`.
pub const DEFAULT_DETAIL_TYPE: &str = "CustomEvent";
/// Used when the body has no usable `source`.
pub const DEFAULT_SOURCE: &str = "custom.app";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventEnvelope {
    /// `None` only when the body had no `detail` key.
    pub detail: Option<Value>,
    #[serde(rename = "detailType")]
    pub detail_type: String,
    pub source: String,
}

impl EventEnvelope {
    /// Extract an envelope from an arbitrary JSON body.
    ///
    /// Non-object bodies behave as if every field were missing.
    pub fn from_json(body: &Value) -> Self {
        let detail = body.get("detail").cloned();
        Self {
            detail,
            detail_type: non_empty_str(body.get("detailType"), DEFAULT_DETAIL_TYPE),
            source: non_empty_str(body.get("source"), DEFAULT_SOURCE),
        }
    }

    /// Build the single entry submitted to `bus_name`.
    pub fn into_entry(self, bus_name: &str) -> Result<BusEntry> {
        let detail = match self.detail {
            Some(v) => Some(
                serde_json::to_string(&v)
                    .map_err(|e| RelayError::Internal(format!("detail encode failed: {e}")))?,
            ),
            None => None,
        };

        Ok(BusEntry {
            event_bus_name: bus_name.to_string(),
            source: self.source,
            detail_type: self.detail_type,
            detail,
        })
    }
}

fn non_empty_str(v: Option<&Value>, fallback: &str) -> String {
    match v.and_then(Value::as_str) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => fallback.to_string(),
    }
}

/// One entry of a "submit batch" call. Field names follow the bus API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BusEntry {
    pub event_bus_name: String,
    pub source: String,
    pub detail_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
