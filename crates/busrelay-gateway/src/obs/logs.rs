//! Structured log records and the HTTPS log-intake shipper.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use busrelay_core::error::{RelayError, Result};

const SHIP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// One record, built fresh per call and sent once.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub ddsource: String,
    pub service: String,
    pub hostname: String,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: String,
    #[serde(skip)]
    pub context: Option<Value>,
}

impl LogRecord {
    pub fn new(
        source: &str,
        service: &str,
        hostname: &str,
        level: LogLevel,
        message: &str,
        context: Option<Value>,
    ) -> Self {
        Self {
            ddsource: source.to_string(),
            service: service.to_string(),
            hostname: hostname.to_string(),
            level,
            message: message.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            context,
        }
    }

    /// Wire body. Object context fields are merged at the top level and win
    /// over the base fields; any other context value lands under `context`.
    pub fn to_body(&self) -> Value {
        let mut body = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        match &self.context {
            Some(Value::Object(ctx)) => {
                for (k, v) in ctx {
                    body.insert(k.clone(), v.clone());
                }
            }
            Some(Value::Null) | None => {}
            Some(other) => {
                body.insert("context".into(), other.clone());
            }
        }
        Value::Object(body)
    }
}

/// Posts records to the log intake. Cheap to clone.
#[derive(Clone)]
pub struct LogShipper {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl LogShipper {
    pub fn new(url: &str, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SHIP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            url: url.to_string(),
            api_key,
        }
    }

    /// False when no credential is configured.
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Single attempt, no retry.
    pub async fn ship(&self, record: &LogRecord) -> Result<()> {
        let Some(key) = &self.api_key else {
            return Err(RelayError::Telemetry("log shipping disabled".into()));
        };

        let resp = self
            .client
            .post(&self.url)
            .header("DD-API-KEY", key)
            .json(&record.to_body())
            .send()
            .await
            .map_err(|e| RelayError::Telemetry(format!("log intake unreachable: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RelayError::Telemetry(format!(
                "log intake rejected record: {status}"
            )));
        }
        Ok(())
    }
}
