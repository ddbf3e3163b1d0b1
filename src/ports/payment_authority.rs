//! Payment authority port.
//!
//! The authority is the source of truth for payments and preapprovals.
//! Webhooks only carry resource ids; reconciliation fetches the current
//! resource state through this port.
//!
//! # Design
//!
//! - **Read-only**: reconciliation never writes to the authority
//! - **Retries inside**: implementations retry transient failures; an error
//!   returned from here means retries were exhausted

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::subscription::{AuthorityPayment, AuthorityPreapproval, SubscriptionError};

/// Port for reading payment-authority resources.
#[async_trait]
pub trait PaymentAuthority: Send + Sync {
    /// `GET /v1/payments/{id}`.
    async fn get_payment(&self, payment_id: &str) -> Result<AuthorityPayment, AuthorityError>;

    /// `GET /preapproval/{id}`.
    async fn get_preapproval(
        &self,
        preapproval_id: &str,
    ) -> Result<AuthorityPreapproval, AuthorityError>;
}

/// Errors from payment authority calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityError {
    /// Error code for categorization.
    pub code: AuthorityErrorCode,

    /// Human-readable error message.
    pub message: String,

    /// Attempts made before giving up.
    pub attempts: u32,
}

impl AuthorityError {
    pub fn new(code: AuthorityErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            attempts: 1,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(
            AuthorityErrorCode::NotFound,
            format!("{} not found", resource),
        )
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AuthorityErrorCode::NetworkError, message)
    }

    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        Self::new(
            AuthorityErrorCode::ProviderError,
            format!("HTTP {}: {}", status, message.into()),
        )
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(AuthorityErrorCode::InvalidResponse, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl std::fmt::Display for AuthorityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} (after {} attempt(s))",
            self.code, self.message, self.attempts
        )
    }
}

impl std::error::Error for AuthorityError {}

impl From<AuthorityError> for DomainError {
    fn from(err: AuthorityError) -> Self {
        let code = match err.code {
            AuthorityErrorCode::NotFound => ErrorCode::PaymentNotFound,
            _ => ErrorCode::ExternalAuthorityError,
        };
        DomainError::new(code, err.to_string())
    }
}

impl From<AuthorityError> for SubscriptionError {
    fn from(err: AuthorityError) -> Self {
        match err.code {
            AuthorityErrorCode::NotFound => SubscriptionError::AuthorityNotFound(err.message),
            _ => SubscriptionError::Authority(err.to_string()),
        }
    }
}

/// Categorized authority error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorityErrorCode {
    /// 404 from the authority.
    NotFound,

    /// Connection, DNS or timeout failure.
    NetworkError,

    /// Any other non-2xx response.
    ProviderError,

    /// 2xx with a body that could not be decoded.
    InvalidResponse,
}

impl AuthorityErrorCode {
    /// Returns true if the request may succeed when repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuthorityErrorCode::NetworkError | AuthorityErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for AuthorityErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuthorityErrorCode::NotFound => "not_found",
            AuthorityErrorCode::NetworkError => "network_error",
            AuthorityErrorCode::ProviderError => "provider_error",
            AuthorityErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_codes_are_retryable() {
        assert!(AuthorityError::network("reset").is_retryable());
        assert!(AuthorityError::provider(502, "bad gateway").is_retryable());
        assert!(!AuthorityError::not_found("payment 1").is_retryable());
        assert!(!AuthorityError::invalid_response("eof").is_retryable());
    }

    #[test]
    fn not_found_maps_to_droppable_subscription_error() {
        let err: SubscriptionError = AuthorityError::not_found("payment 1").into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn exhausted_retries_map_to_retryable_subscription_error() {
        let err: SubscriptionError = AuthorityError::network("timeout").with_attempts(3).into();
        assert!(err.is_retryable());
        assert!(err.message().contains("after 3 attempt(s)"));
    }
}
