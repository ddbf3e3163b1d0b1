//! Booking repository port.
//!
//! # Concurrency
//!
//! `update` is a compare-and-swap on `version`: the write succeeds only if
//! the stored version equals `booking.version`, and stores `version + 1`.

use async_trait::async_trait;

use crate::domain::booking::Booking;
use crate::domain::foundation::{BookingId, DomainError, UserId};

/// Repository port for Booking aggregate persistence.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Save a new booking.
    async fn save(&self, booking: &Booking) -> Result<(), DomainError>;

    /// Persist a mutated booking if nobody else has written it since it
    /// was loaded. Returns the new version.
    ///
    /// # Errors
    ///
    /// - `BookingNotFound` if the booking doesn't exist
    /// - `ConcurrentModification` if the stored version moved on
    /// - `DatabaseError` on persistence failure
    async fn update(&self, booking: &Booking) -> Result<u64, DomainError>;

    /// Find a booking by its ID.
    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError>;

    /// Number of bookings requested by `client_id`.
    async fn count_by_client(&self, client_id: &UserId) -> Result<u32, DomainError>;
}
