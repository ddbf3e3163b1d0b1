//! Webhook error types for payment-authority notifications.
//!
//! Defines the error conditions of webhook ingestion with HTTP status code
//! mapping and retryability semantics.

use axum::http::StatusCode;
use thiserror::Error;

use super::SubscriptionError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Body is not a JSON object.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing or blank in the envelope.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Event was intentionally dropped (not an error condition).
    #[error("Event ignored: {0}")]
    Ignored(String),

    /// Payment authority unreachable after retries.
    #[error("Payment authority error: {0}")]
    Authority(String),

    /// A concurrent reconciliation won the subscription update.
    #[error("Concurrent update: {0}")]
    Conflict(String),

    /// Repository failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Dedup cache failure.
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl WebhookError {
    /// Returns true if the authority should redeliver this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Authority(_)
                | WebhookError::Conflict(_)
                | WebhookError::Database(_)
                | WebhookError::StorageError(_)
        )
    }

    /// Maps the error to an HTTP status code.
    ///
    /// - 2xx: acknowledged, no redelivery
    /// - 4xx: malformed, no redelivery
    /// - 5xx: redelivered by the authority
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::ParseError(_) | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            WebhookError::Ignored(_) => StatusCode::OK,

            WebhookError::Authority(_)
            | WebhookError::Conflict(_)
            | WebhookError::Database(_)
            | WebhookError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SubscriptionError> for WebhookError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::Authority(msg) => WebhookError::Authority(msg),
            SubscriptionError::Conflict(msg) => WebhookError::Conflict(msg),
            SubscriptionError::Infrastructure(msg) => WebhookError::Database(msg),
            other => WebhookError::Ignored(other.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::SubscriptionStatus;

    // ══════════════════════════════════════════════════════════════
    // Display
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn missing_field_displays_field_name() {
        let err = WebhookError::MissingField("data.id");
        assert_eq!(format!("{}", err), "Missing field: data.id");
    }

    #[test]
    fn ignored_displays_reason() {
        let err = WebhookError::Ignored("plan not found".to_string());
        assert_eq!(format!("{}", err), "Event ignored: plan not found");
    }

    // ══════════════════════════════════════════════════════════════
    // Status codes and retryability
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn malformed_input_is_bad_request() {
        assert_eq!(
            WebhookError::ParseError("eof".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert!(!WebhookError::MissingField("type").is_retryable());
    }

    #[test]
    fn ignored_is_acknowledged() {
        let err = WebhookError::Ignored("unknown status".into());
        assert_eq!(err.status_code(), StatusCode::OK);
        assert!(!err.is_retryable());
    }

    #[test]
    fn transient_failures_ask_for_redelivery() {
        for err in [
            WebhookError::Authority("503".into()),
            WebhookError::Conflict("version 3".into()),
            WebhookError::Database("pool".into()),
            WebhookError::StorageError("redis".into()),
        ] {
            assert!(err.is_retryable());
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn subscription_errors_split_by_retryability() {
        let retry: WebhookError = SubscriptionError::authority("timeout").into();
        assert!(retry.is_retryable());

        let raced: WebhookError = SubscriptionError::Conflict("sub-1".into()).into();
        assert!(matches!(raced, WebhookError::Conflict(_)));

        let drop: WebhookError = SubscriptionError::invalid_transition(
            SubscriptionStatus::Cancelled,
            SubscriptionStatus::Paused,
        )
        .into();
        assert!(matches!(drop, WebhookError::Ignored(_)));
    }
}
