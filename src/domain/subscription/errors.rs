//! Subscription reconciliation errors.
//!
//! Most of these are dropped (logged) on the webhook path; only
//! `Authority`, `Conflict` and `Infrastructure` ask the authority to
//! redeliver.

use crate::domain::foundation::{DomainError, ErrorCode, PlanId, SubscriptionId, UserId};

use super::SubscriptionStatus;

/// Subscription-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// No subscription matched the event.
    NotFound(String),

    /// No current subscription for the user.
    NotFoundForUser(UserId),

    /// Referenced plan does not exist.
    PlanNotFound(PlanId),

    /// External reference could not be parsed.
    MalformedReference(String),

    /// Transition rejected by the subscription state machine.
    InvalidTransition {
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    },

    /// A pending payment tried to move an active subscription back on hold.
    RegressionRefused(SubscriptionId),

    /// The authority does not know the resource.
    AuthorityNotFound(String),

    /// The authority could not be reached after retries.
    Authority(String),

    /// Another reconciliation updated the subscription first.
    Conflict(String),

    /// Storage failure.
    Infrastructure(String),
}

impl SubscriptionError {
    pub fn not_found(external_id: impl Into<String>) -> Self {
        SubscriptionError::NotFound(external_id.into())
    }

    pub fn invalid_transition(from: SubscriptionStatus, to: SubscriptionStatus) -> Self {
        SubscriptionError::InvalidTransition { from, to }
    }

    pub fn authority(message: impl Into<String>) -> Self {
        SubscriptionError::Authority(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::NotFound(_) | SubscriptionError::NotFoundForUser(_) => {
                ErrorCode::SubscriptionNotFound
            }
            SubscriptionError::PlanNotFound(_) => ErrorCode::PlanNotFound,
            SubscriptionError::MalformedReference(_) => ErrorCode::ValidationFailed,
            SubscriptionError::InvalidTransition { .. }
            | SubscriptionError::RegressionRefused(_) => ErrorCode::InvalidStateTransition,
            SubscriptionError::AuthorityNotFound(_) => ErrorCode::PaymentNotFound,
            SubscriptionError::Authority(_) => ErrorCode::ExternalAuthorityError,
            SubscriptionError::Conflict(_) => ErrorCode::ConcurrentModification,
            SubscriptionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a human-readable error message.
    pub fn message(&self) -> String {
        match self {
            SubscriptionError::NotFound(id) => format!("Subscription not found: {}", id),
            SubscriptionError::NotFoundForUser(user) => {
                format!("No current subscription for user: {}", user)
            }
            SubscriptionError::PlanNotFound(plan) => format!("Plan not found: {}", plan),
            SubscriptionError::MalformedReference(reference) => {
                format!("Malformed external reference: {}", reference)
            }
            SubscriptionError::InvalidTransition { from, to } => {
                format!("Cannot move subscription from {} to {}", from, to)
            }
            SubscriptionError::RegressionRefused(id) => {
                format!("Subscription {} is active and will not be put on hold", id)
            }
            SubscriptionError::AuthorityNotFound(id) => {
                format!("Payment authority has no resource {}", id)
            }
            SubscriptionError::Authority(msg) => format!("Payment authority error: {}", msg),
            SubscriptionError::Conflict(msg) => format!("Concurrent update: {}", msg),
            SubscriptionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if the authority should redeliver the event.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubscriptionError::Authority(_)
                | SubscriptionError::Conflict(_)
                | SubscriptionError::Infrastructure(_)
        )
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SubscriptionError {}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ExternalAuthorityError => SubscriptionError::Authority(err.message),
            ErrorCode::PaymentNotFound => SubscriptionError::AuthorityNotFound(err.message),
            ErrorCode::ConcurrentModification => SubscriptionError::Conflict(err.message),
            _ => SubscriptionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_authority_conflict_and_storage_failures_are_retryable() {
        assert!(SubscriptionError::authority("timeout").is_retryable());
        assert!(SubscriptionError::Conflict("sub-1".into()).is_retryable());
        assert!(SubscriptionError::infrastructure("pool closed").is_retryable());
        assert!(!SubscriptionError::not_found("pre-1").is_retryable());
        assert!(!SubscriptionError::MalformedReference("x".into()).is_retryable());
        assert!(!SubscriptionError::invalid_transition(
            SubscriptionStatus::Cancelled,
            SubscriptionStatus::Active
        )
        .is_retryable());
    }

    #[test]
    fn domain_authority_error_round_trips() {
        let domain = DomainError::new(ErrorCode::ExternalAuthorityError, "502 after 3 attempts");
        let err: SubscriptionError = domain.into();
        assert_eq!(err, SubscriptionError::Authority("502 after 3 attempts".into()));
        let back: DomainError = err.into();
        assert_eq!(back.code, ErrorCode::ExternalAuthorityError);
    }
}
