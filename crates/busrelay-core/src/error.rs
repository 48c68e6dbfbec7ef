//! Shared error type across busrelay crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed body.
    BadRequest,
    /// Configuration could not be resolved.
    Config,
    /// The event bus rejected or never answered a submission.
    BusUnavailable,
    /// Metrics or log shipping failed.
    Telemetry,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Config => "CONFIG",
            ClientCode::BusUnavailable => "BUS_UNAVAILABLE",
            ClientCode::Telemetry => "TELEMETRY",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("config: {0}")]
    Config(String),
    #[error("event bus: {0}")]
    Bus(String),
    #[error("telemetry: {0}")]
    Telemetry(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl RelayError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            RelayError::BadRequest(_) => ClientCode::BadRequest,
            RelayError::Config(_) => ClientCode::Config,
            RelayError::Bus(_) => ClientCode::BusUnavailable,
            RelayError::Telemetry(_) => ClientCode::Telemetry,
            RelayError::Internal(_) => ClientCode::Internal,
        }
    }
}
