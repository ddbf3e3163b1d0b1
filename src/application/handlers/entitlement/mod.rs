//! Entitlement handlers.
//!
//! ## Commands
//! - Reconcile a user's roles and posts with their subscription
//!
//! ## Queries
//! - Cached entitlements (single-flight refresh)
//! - Permission checks on top of the cached entitlements

mod check_permission;
mod entitlement_cache;
mod reconcile_entitlements;

pub use check_permission::{CheckPermissionHandler, CheckPermissionQuery};
pub use entitlement_cache::{EntitlementCache, EntitlementCacheConfig};
pub use reconcile_entitlements::{ReconcileEntitlementsCommand, ReconcileEntitlementsHandler};
