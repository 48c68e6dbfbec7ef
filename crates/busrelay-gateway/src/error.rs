//! HTTP rendering of [`RelayError`] for non-bus failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use busrelay_core::error::RelayError;

/// Handler error wrapper so `?` on core results yields a JSON response.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub RelayError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "error": self.0.client_code().as_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
