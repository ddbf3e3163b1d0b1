//! Axum router configuration for entitlement endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{check_permission, get_entitlements, EntitlementAppState};

/// Create the entitlement router. Both routes require `X-User-Id`.
pub fn entitlement_routes() -> Router<EntitlementAppState> {
    Router::new()
        .route("/entitlements", get(get_entitlements))
        .route("/permissions/check", post(check_permission))
}
