//! Fixtures shared by the booking handler tests.

use std::sync::Arc;

use crate::adapters::memory::{InMemoryBookingRepository, InMemoryPostRepository};
use crate::adapters::notifications::RecordingNotificationSender;
use crate::domain::booking::{Booking, BookingStatus, NewBooking};
use crate::domain::foundation::{BookingId, PostId, Timestamp, UserId};
use crate::ports::{BookingRepository, NotificationSender};

pub fn client() -> UserId {
    UserId::new("client-1").unwrap()
}

pub fn owner() -> UserId {
    UserId::new("owner-1").unwrap()
}

pub fn requested_booking() -> Booking {
    booking_starting_in(10)
}

pub fn booking_starting_in(days: i64) -> Booking {
    let now = Timestamp::now();
    Booking::request(
        BookingId::new(),
        NewBooking {
            client_id: client(),
            owner_id: owner(),
            post_id: PostId::new(),
            total_amount: 10_000,
            currency: "ARS".to_string(),
            start_date: now.add_days(days),
            end_date: now.add_days(days + 2),
            guest_count: 2,
        },
        now,
    )
    .unwrap()
}

/// Moves a fresh booking to `status` through the domain operations.
pub fn booking_in(status: BookingStatus, mut booking: Booking) -> Booking {
    let now = Timestamp::now();
    match status {
        BookingStatus::Requested => {}
        BookingStatus::PendingPayment => {
            booking.accept(&owner(), now).unwrap();
        }
        BookingStatus::Paid => {
            booking.accept(&owner(), now).unwrap();
            booking.mark_paid(now).unwrap();
        }
        BookingStatus::Declined => {
            booking.decline(&owner(), "fully booked", now).unwrap();
        }
        other => panic!("fixture does not build {} bookings", other),
    }
    booking
}

pub struct Fixture {
    pub bookings: Arc<InMemoryBookingRepository>,
    pub posts: Arc<InMemoryPostRepository>,
    pub sender: RecordingNotificationSender,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            bookings: Arc::new(InMemoryBookingRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            sender: RecordingNotificationSender::new(),
        }
    }

    pub fn with_failing_notifier() -> Self {
        Self {
            sender: RecordingNotificationSender::failing(),
            ..Self::new()
        }
    }

    pub fn notifier(&self) -> Arc<dyn NotificationSender> {
        Arc::new(self.sender.clone())
    }

    pub async fn store(&self, booking: Booking) -> Booking {
        self.bookings.save(&booking).await.unwrap();
        booking
    }

    pub async fn reload(&self, id: BookingId) -> Booking {
        self.bookings.find_by_id(&id).await.unwrap().unwrap()
    }
}
