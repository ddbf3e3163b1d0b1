//! Request bodies for entitlement endpoints.
//!
//! Responses reuse the serializable domain views (`UserEntitlements`,
//! `PermissionDecision`).

use serde::Deserialize;

use crate::domain::entitlement::PermissionAction;

/// Body of `POST /permissions/check`.
#[derive(Debug, Clone, Deserialize)]
pub struct PermissionCheckRequest {
    pub action: PermissionAction,
}
