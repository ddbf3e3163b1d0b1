//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresBookingRepository` - Bookings with version compare-and-swap
//! - `PostgresSubscriptionRepository` - Subscriptions and their audit metadata
//! - `PostgresPaymentRepository` - Forward-only payment records
//! - `PostgresUserRepository`, `PostgresPostRepository`, `PostgresPlanRepository`

mod booking_repository;
mod payment_repository;
mod plan_repository;
mod post_repository;
mod subscription_repository;
mod user_repository;

pub use booking_repository::PostgresBookingRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use plan_repository::PostgresPlanRepository;
pub use post_repository::PostgresPostRepository;
pub use subscription_repository::PostgresSubscriptionRepository;
pub use user_repository::PostgresUserRepository;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Maps a sqlx error into a database `DomainError` naming the failed action.
pub(crate) fn db_error(action: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::database(format!("Failed to {}: {}", action, e))
}

pub(crate) fn parse_user_id(raw: String) -> Result<UserId, DomainError> {
    UserId::new(raw).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid user id: {}", e))
    })
}
