//! In-memory repository implementations.
//!
//! Used by the integration tests and by the server when no database URL is
//! configured. Nothing survives a restart.

mod booking_repository;
mod entitlement_repositories;
mod subscription_repositories;

pub use booking_repository::InMemoryBookingRepository;
pub use entitlement_repositories::{InMemoryPostRepository, InMemoryUserRepository};
pub use subscription_repositories::{
    InMemoryPaymentRepository, InMemoryPlanRepository, InMemorySubscriptionRepository,
};

use std::sync::{Mutex, MutexGuard};

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
