//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter with its own state; `router`
//! assembles them behind the shared middleware stack.

pub mod booking;
pub mod entitlement;
pub mod error;
pub mod health;
pub mod identity;
mod router;
pub mod webhook;

pub use booking::{booking_routes, BookingAppState};
pub use entitlement::{entitlement_routes, EntitlementAppState};
pub use error::ErrorResponse;
pub use identity::{
    AuthenticatedUser, SystemCaller, SystemToken, SYSTEM_TOKEN_HEADER, USER_ID_HEADER,
};
pub use router::{app_router, AppState};
pub use webhook::{webhook_routes, WebhookAppState};
