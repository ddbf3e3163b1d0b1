//! Entitlement domain module.
//!
//! Roles, post activation and quotas derived from a user's subscription.

mod entitlements;
mod errors;
mod post;
mod user;

pub use entitlements::{
    check_permission, plan_roles, PermissionAction, PermissionDecision, RolePlan,
    UserEntitlements, Usage, DEACTIVATION_REASON, RECONCILIATION_ACTOR,
};
pub use errors::EntitlementError;
pub use post::{Post, PostStatus};
pub use user::{Role, RoleAssignment, User};
