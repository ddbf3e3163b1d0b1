//! Error body shared by every HTTP adapter.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// `{error, code}` body returned on every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Error code for programmatic handling.
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl ToString, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }

    /// Pairs the body with `status`.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        if status.is_server_error() {
            tracing::error!(code = %self.code, error = %self.error, "Request failed");
        }
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn serializes_error_and_code() {
        let body = ErrorResponse::new(ErrorCode::BookingNotFound, "Booking not found: 1");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"error": "Booking not found: 1", "code": "BOOKING_NOT_FOUND"})
        );
    }
}
