//! HTTP adapter for entitlements.
//!
//! - `GET /entitlements` - Caller's entitlements
//! - `POST /permissions/check` - Gate an action

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{EntitlementApiError, EntitlementAppState};
pub use routes::entitlement_routes;
