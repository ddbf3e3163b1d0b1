//! CheckPermissionHandler - Gates an action on the caller's entitlements.

use std::sync::Arc;

use crate::domain::entitlement::{
    check_permission, EntitlementError, PermissionAction, PermissionDecision,
};
use crate::domain::foundation::UserId;

use super::EntitlementCache;

#[derive(Debug, Clone)]
pub struct CheckPermissionQuery {
    pub user_id: UserId,
    pub action: PermissionAction,
}

pub struct CheckPermissionHandler {
    entitlements: Arc<EntitlementCache>,
}

impl CheckPermissionHandler {
    pub fn new(entitlements: Arc<EntitlementCache>) -> Self {
        Self { entitlements }
    }

    pub async fn handle(
        &self,
        query: CheckPermissionQuery,
    ) -> Result<PermissionDecision, EntitlementError> {
        let entitlements = self.entitlements.entitlements_for(&query.user_id).await?;
        let decision = check_permission(&entitlements, query.action);
        if !decision.allowed {
            tracing::debug!(
                user_id = %query.user_id,
                action = ?query.action,
                reason = decision.reason.as_deref().unwrap_or_default(),
                "Permission denied"
            );
        }
        Ok(decision)
    }
}
