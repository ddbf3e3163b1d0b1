//! Axum router configuration for booking endpoints.

use axum::routing::post;
use axum::Router;

use super::handlers::{
    accept_booking, cancel_booking, complete_booking, decline_booking, payment_captured,
    BookingAppState,
};

/// Create the booking API router.
///
/// # Routes
///
/// ## Participant endpoints (require `X-User-Id`)
/// - `POST /bookings/:id/accept`
/// - `POST /bookings/:id/decline`
/// - `POST /bookings/:id/cancel`
///
/// ## System endpoints (require `X-System-Token`)
/// - `POST /bookings/:id/payment-captured`
/// - `POST /bookings/:id/complete`
pub fn booking_routes() -> Router<BookingAppState> {
    Router::new()
        .route("/bookings/:id/accept", post(accept_booking))
        .route("/bookings/:id/decline", post(decline_booking))
        .route("/bookings/:id/cancel", post(cancel_booking))
        .route("/bookings/:id/payment-captured", post(payment_captured))
        .route("/bookings/:id/complete", post(complete_booking))
}
