//! In-memory BookingRepository with the same compare-and-swap contract as
//! the PostgreSQL adapter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::booking::Booking;
use crate::domain::foundation::{BookingId, DomainError, ErrorCode, UserId};
use crate::ports::BookingRepository;

use super::lock;

#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: Mutex<HashMap<BookingId, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.bookings).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.bookings).is_empty()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn save(&self, booking: &Booking) -> Result<(), DomainError> {
        let mut bookings = lock(&self.bookings);
        if bookings.contains_key(&booking.id) {
            return Err(DomainError::validation("id", "Booking already exists"));
        }
        bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn update(&self, booking: &Booking) -> Result<u64, DomainError> {
        let mut bookings = lock(&self.bookings);
        let stored = bookings.get_mut(&booking.id).ok_or_else(|| {
            DomainError::new(ErrorCode::BookingNotFound, "Booking not found")
                .with_detail("booking_id", booking.id.to_string())
        })?;

        if stored.version != booking.version {
            return Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                "Booking was modified by another request",
            )
            .with_detail("booking_id", booking.id.to_string()));
        }

        let next_version = booking.version + 1;
        *stored = Booking {
            version: next_version,
            ..booking.clone()
        };
        Ok(next_version)
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError> {
        Ok(lock(&self.bookings).get(id).cloned())
    }

    async fn count_by_client(&self, client_id: &UserId) -> Result<u32, DomainError> {
        let count = lock(&self.bookings)
            .values()
            .filter(|b| &b.client_id == client_id)
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}
