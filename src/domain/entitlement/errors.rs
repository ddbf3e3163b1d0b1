//! Entitlement synchronizer errors.

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Entitlement-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitlementError {
    /// User does not exist.
    UserNotFound(UserId),

    /// Another request is computing the entitlements and no cached value
    /// exists yet.
    Unavailable(UserId),

    /// Shared cache failure.
    Cache(String),

    /// Repository failure.
    Infrastructure(String),
}

impl EntitlementError {
    pub fn cache(message: impl Into<String>) -> Self {
        EntitlementError::Cache(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        EntitlementError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EntitlementError::UserNotFound(_) => ErrorCode::UserNotFound,
            EntitlementError::Unavailable(_) => ErrorCode::ServiceUnavailable,
            EntitlementError::Cache(_) => ErrorCode::CacheError,
            EntitlementError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a human-readable error message.
    pub fn message(&self) -> String {
        match self {
            EntitlementError::UserNotFound(id) => format!("User not found: {}", id),
            EntitlementError::Unavailable(id) => {
                format!("Entitlements for {} are being refreshed, retry shortly", id)
            }
            EntitlementError::Cache(msg) => format!("Cache error: {}", msg),
            EntitlementError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for EntitlementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for EntitlementError {}

impl From<DomainError> for EntitlementError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::CacheError => EntitlementError::Cache(err.message),
            _ => EntitlementError::Infrastructure(err.to_string()),
        }
    }
}

impl From<EntitlementError> for DomainError {
    fn from(err: EntitlementError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
