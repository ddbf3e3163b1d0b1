//! Caller identity.
//!
//! The upstream identity gateway authenticates the caller and forwards its
//! user id in the `X-User-Id` header. Internal services (payment capture,
//! service completion) present the shared system token in `X-System-Token`
//! instead.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::domain::foundation::UserId;

use super::error::ErrorResponse;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Authenticated user extracted from the request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection when the identity header is missing or blank.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> Response {
        ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required")
            .into_response_with(StatusCode::UNAUTHORIZED)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| UserId::new(s.trim()).ok())
            .ok_or(AuthenticationRequired)?;

        Ok(AuthenticatedUser { user_id })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// System callers
// ════════════════════════════════════════════════════════════════════════════════

/// Header carrying the shared system token.
pub const SYSTEM_TOKEN_HEADER: &str = "X-System-Token";

/// The token internal callers must present. Without one configured every
/// system call is refused.
#[derive(Debug, Clone, Default)]
pub struct SystemToken(Option<Arc<SecretString>>);

impl SystemToken {
    pub fn new(secret: SecretString) -> Self {
        Self(Some(Arc::new(secret)))
    }

    pub fn from_config(secret: Option<&SecretString>) -> Self {
        match secret {
            Some(secret) => Self::new(secret.clone()),
            None => Self::default(),
        }
    }

    fn accepts(&self, presented: &str) -> bool {
        match &self.0 {
            Some(expected) => bool::from(
                expected
                    .expose_secret()
                    .as_bytes()
                    .ct_eq(presented.as_bytes()),
            ),
            None => false,
        }
    }
}

/// An internal service that presented the system token.
#[derive(Debug, Clone, Copy)]
pub struct SystemCaller;

/// Rejection for system endpoints.
#[derive(Debug, PartialEq, Eq)]
pub enum SystemCallRejected {
    /// No token in the request.
    Missing,
    /// A token that does not match, or none is configured.
    Invalid,
}

impl IntoResponse for SystemCallRejected {
    fn into_response(self) -> Response {
        match self {
            SystemCallRejected::Missing => {
                ErrorResponse::new("AUTHENTICATION_REQUIRED", "System token is required")
                    .into_response_with(StatusCode::UNAUTHORIZED)
            }
            SystemCallRejected::Invalid => {
                ErrorResponse::new("FORBIDDEN", "System token is not valid")
                    .into_response_with(StatusCode::FORBIDDEN)
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SystemCaller
where
    SystemToken: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SystemCallRejected;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(SYSTEM_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(SystemCallRejected::Missing)?;

        if !SystemToken::from_ref(state).accepts(presented) {
            tracing::warn!("Rejected system call with an invalid token");
            return Err(SystemCallRejected::Invalid);
        }
        Ok(SystemCaller)
    }
}
