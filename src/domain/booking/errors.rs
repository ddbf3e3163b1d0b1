//! Booking-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | Forbidden | 403 |
//! | InvalidTransition | 409 |
//! | ServiceNotElapsed | 409 |
//! | ConcurrentModification | 409 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{BookingId, DomainError, ErrorCode, UserId, ValidationError};

use super::BookingStatus;

/// Booking-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Booking was not found.
    NotFound(BookingId),

    /// Actor is not the party required for the operation.
    Forbidden { actor: UserId, required: String },

    /// Transition rejected by the booking state machine.
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// Completion requested before the booking's end date.
    ServiceNotElapsed(BookingId),

    /// Another writer updated the booking first.
    ConcurrentModification(BookingId),

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl BookingError {
    pub fn not_found(id: BookingId) -> Self {
        BookingError::NotFound(id)
    }

    pub fn forbidden(actor: UserId, required: impl Into<String>) -> Self {
        BookingError::Forbidden {
            actor,
            required: required.into(),
        }
    }

    pub fn invalid_transition(from: BookingStatus, to: BookingStatus) -> Self {
        BookingError::InvalidTransition { from, to }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BookingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BookingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BookingError::NotFound(_) => ErrorCode::BookingNotFound,
            BookingError::Forbidden { .. } => ErrorCode::Forbidden,
            BookingError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            BookingError::ServiceNotElapsed(_) => ErrorCode::ServiceNotElapsed,
            BookingError::ConcurrentModification(_) => ErrorCode::ConcurrentModification,
            BookingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            BookingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            BookingError::NotFound(id) => format!("Booking not found: {}", id),
            BookingError::Forbidden { required, .. } => {
                format!("Only the booking {} may perform this action", required)
            }
            BookingError::InvalidTransition { from, to } => {
                format!("Cannot move booking from {} to {}", from, to)
            }
            BookingError::ServiceNotElapsed(id) => {
                format!("Booking {} has not reached its end date", id)
            }
            BookingError::ConcurrentModification(id) => {
                format!("Booking {} was modified concurrently, retry the request", id)
            }
            BookingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            BookingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BookingError::ConcurrentModification(_) | BookingError::Infrastructure(_)
        )
    }
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BookingError {}

impl From<ValidationError> for BookingError {
    fn from(err: ValidationError) -> Self {
        BookingError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for BookingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => BookingError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => BookingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<BookingError> for DomainError {
    fn from(err: BookingError) -> Self {
        let domain = DomainError::new(err.code(), err.message());
        match &err {
            BookingError::NotFound(id)
            | BookingError::ServiceNotElapsed(id)
            | BookingError::ConcurrentModification(id) => {
                domain.with_detail("booking_id", id.to_string())
            }
            BookingError::ValidationFailed { field, .. } => {
                domain.with_detail("field", field.clone())
            }
            _ => domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_variants() {
        let id = BookingId::new();
        assert_eq!(BookingError::not_found(id).code(), ErrorCode::BookingNotFound);
        assert_eq!(
            BookingError::invalid_transition(BookingStatus::Declined, BookingStatus::Paid).code(),
            ErrorCode::InvalidStateTransition
        );
        assert_eq!(
            BookingError::ConcurrentModification(id).code(),
            ErrorCode::ConcurrentModification
        );
    }

    #[test]
    fn invalid_transition_message_names_both_states() {
        let err = BookingError::invalid_transition(BookingStatus::Cancelled, BookingStatus::Cancelled);
        assert_eq!(err.message(), "Cannot move booking from cancelled to cancelled");
    }

    #[test]
    fn validation_error_keeps_field() {
        let err: BookingError = ValidationError::empty_field("rejection_reason").into();
        assert!(matches!(
            err,
            BookingError::ValidationFailed { ref field, .. } if field == "rejection_reason"
        ));
    }

    #[test]
    fn converts_to_domain_error_with_booking_detail() {
        let id = BookingId::new();
        let err: DomainError = BookingError::not_found(id).into();
        assert_eq!(err.code, ErrorCode::BookingNotFound);
        assert_eq!(err.details.get("booking_id"), Some(&id.to_string()));
    }

    #[test]
    fn only_races_and_infrastructure_are_retryable() {
        assert!(BookingError::ConcurrentModification(BookingId::new()).is_retryable());
        assert!(BookingError::infrastructure("db down").is_retryable());
        assert!(!BookingError::validation("reason", "empty").is_retryable());
    }
}
