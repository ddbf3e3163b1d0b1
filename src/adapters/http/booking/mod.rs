//! HTTP adapter for booking transitions.
//!
//! - `POST /bookings/:id/accept` - Owner accepts a request
//! - `POST /bookings/:id/decline` - Owner declines with a reason
//! - `POST /bookings/:id/cancel` - Client or publisher cancels, returns the penalty
//! - `POST /bookings/:id/payment-captured` - Payment captured (system)
//! - `POST /bookings/:id/complete` - Service elapsed (system)

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{BookingApiError, BookingAppState};
pub use routes::booking_routes;
