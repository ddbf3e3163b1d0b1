//! Entitlement rules.
//!
//! Pure functions deciding which roles a user should hold given their
//! current subscription, what quotas remain, and whether an action is
//! permitted. Persistence of the outcome is the synchronizer's job.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PlanId, UserId};
use crate::domain::subscription::{Plan, Subscription, SubscriptionStatus};

use super::{Role, User};

/// Actor recorded on role assignments made by reconciliation.
pub const RECONCILIATION_ACTOR: &str = "system:entitlement-sync";

/// Audit reason stamped on posts deactivated by a revocation.
pub const DEACTIVATION_REASON: &str = "Publisher subscription is no longer active";

/// Role changes required to bring a user in line with their subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePlan {
    pub grant: Vec<Role>,
    pub revoke: Vec<Role>,
    pub deactivate_posts: bool,
}

impl RolePlan {
    pub fn is_empty(&self) -> bool {
        self.grant.is_empty() && self.revoke.is_empty() && !self.deactivate_posts
    }
}

/// Decides role changes. Superadmins are never touched and the referral
/// role is outside subscription control.
pub fn plan_roles(user: &User, subscription: Option<&Subscription>) -> RolePlan {
    let mut plan = RolePlan::default();
    if user.has_role(Role::Superadmin) {
        return plan;
    }

    let is_active = subscription.map(|s| s.status) == Some(SubscriptionStatus::Active);

    if !user.has_role(Role::Client) {
        plan.grant.push(Role::Client);
    }
    if is_active {
        if !user.has_role(Role::Publisher) {
            plan.grant.push(Role::Publisher);
        }
    } else if user.has_role(Role::Publisher) {
        plan.revoke.push(Role::Publisher);
        plan.deactivate_posts = true;
    }
    plan
}

/// Usage counted against plan quotas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub active_posts: u32,
    pub bookings: u32,
}

/// Snapshot of what a user may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntitlements {
    pub user_id: UserId,
    pub roles: Vec<Role>,
    pub has_subscription: bool,
    pub is_active: bool,
    pub subscription_status: Option<SubscriptionStatus>,
    pub plan_id: Option<PlanId>,
    pub remaining_posts: Option<u32>,
    pub remaining_bookings: Option<u32>,
    pub can_create_posts: bool,
    pub can_create_bookings: bool,
    pub payment_account_connected: bool,
}

impl UserEntitlements {
    /// Computes entitlements from the user's post-reconciliation state.
    pub fn evaluate(
        user: &User,
        subscription: Option<&Subscription>,
        plan: Option<&Plan>,
        usage: Usage,
    ) -> Self {
        let status = subscription.map(|s| s.status);
        let has_subscription = status.map(|s| s.counts_as_subscribed()).unwrap_or(false);
        let is_active = status == Some(SubscriptionStatus::Active);

        let remaining_posts = plan.and_then(|p| p.remaining_posts(usage.active_posts));
        let remaining_bookings = plan.and_then(|p| p.remaining_bookings(usage.bookings));

        Self {
            user_id: user.id.clone(),
            roles: user.active_roles(),
            has_subscription,
            is_active,
            subscription_status: status,
            plan_id: subscription.map(|s| s.plan_id.clone()),
            remaining_posts,
            remaining_bookings,
            can_create_posts: is_active && has_quota(remaining_posts),
            can_create_bookings: is_active && has_quota(remaining_bookings),
            payment_account_connected: user.payment_account_connected,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

fn has_quota(remaining: Option<u32>) -> bool {
    remaining.map(|r| r > 0).unwrap_or(true)
}

/// Gated actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionAction {
    CreatePost,
    CreateBooking,
    Publish,
}

/// Outcome of a permission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PermissionDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Gates `action` on the given entitlements.
pub fn check_permission(
    entitlements: &UserEntitlements,
    action: PermissionAction,
) -> PermissionDecision {
    match action {
        PermissionAction::CreatePost => {
            if !entitlements.is_active {
                PermissionDecision::deny("An active subscription is required to create posts")
            } else if !entitlements.can_create_posts {
                PermissionDecision::deny("Your plan's post limit has been reached")
            } else if !entitlements.payment_account_connected {
                PermissionDecision::deny("Connect a payment account before creating posts")
            } else {
                PermissionDecision::allow()
            }
        }
        PermissionAction::CreateBooking => {
            if !entitlements.is_active {
                PermissionDecision::deny("An active subscription is required to create bookings")
            } else if !entitlements.can_create_bookings {
                PermissionDecision::deny("Your plan's booking limit has been reached")
            } else {
                PermissionDecision::allow()
            }
        }
        PermissionAction::Publish => {
            if entitlements.is_active && entitlements.has_role(Role::Publisher) {
                PermissionDecision::allow()
            } else {
                PermissionDecision::deny(
                    "An active subscription and the publisher role are required to publish",
                )
            }
        }
    }
}
