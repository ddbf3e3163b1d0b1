//! DeclineBookingHandler - Owner declines a requested booking.

use std::sync::Arc;

use crate::domain::booking::{required_reason, Booking, BookingError};
use crate::domain::foundation::{BookingId, Timestamp, UserId};
use crate::ports::{BookingRepository, NotificationSender};

use super::transition::{commit, load};

#[derive(Debug, Clone)]
pub struct DeclineBookingCommand {
    pub booking_id: BookingId,
    pub actor: UserId,
    pub reason: String,
}

pub struct DeclineBookingHandler {
    repository: Arc<dyn BookingRepository>,
    notifier: Arc<dyn NotificationSender>,
}

impl DeclineBookingHandler {
    pub fn new(
        repository: Arc<dyn BookingRepository>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// The reason is validated before the booking is read.
    pub async fn handle(&self, cmd: DeclineBookingCommand) -> Result<Booking, BookingError> {
        let reason = required_reason("rejection_reason", &cmd.reason)?;

        let mut booking = load(self.repository.as_ref(), cmd.booking_id).await?;
        let notification = booking.decline(&cmd.actor, &reason, Timestamp::now())?;
        commit(
            self.repository.as_ref(),
            self.notifier.as_ref(),
            &mut booking,
            notification,
        )
        .await?;
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::booking::test_support::{
        booking_in, owner, requested_booking, Fixture,
    };
    use crate::domain::booking::{BookingNotification, BookingStatus};

    fn decline(booking_id: BookingId, reason: &str) -> DeclineBookingCommand {
        DeclineBookingCommand {
            booking_id,
            actor: owner(),
            reason: reason.to_string(),
        }
    }

    #[tokio::test]
    async fn declines_with_trimmed_reason() {
        let fx = Fixture::new();
        let booking = fx.store(requested_booking()).await;
        let handler = DeclineBookingHandler::new(fx.bookings.clone(), fx.notifier());

        let declined = handler.handle(decline(booking.id, "  fully booked ")).await.unwrap();

        assert_eq!(declined.status, BookingStatus::Declined);
        assert_eq!(declined.rejection_reason.as_deref(), Some("fully booked"));
        assert!(declined.declined_at.is_some());
        assert!(matches!(
            fx.sender.sent().as_slice(),
            [BookingNotification::Declined { reason, .. }] if reason == "fully booked"
        ));
    }

    #[tokio::test]
    async fn empty_reason_fails_before_reading_state() {
        let fx = Fixture::new();
        let handler = DeclineBookingHandler::new(fx.bookings.clone(), fx.notifier());

        // Booking does not exist; validation must still win.
        let err = handler.handle(decline(BookingId::new(), "   ")).await.unwrap_err();

        assert!(matches!(
            err,
            BookingError::ValidationFailed { ref field, .. } if field == "rejection_reason"
        ));
    }

    #[tokio::test]
    async fn cannot_decline_an_accepted_booking() {
        let fx = Fixture::new();
        let booking = fx
            .store(booking_in(BookingStatus::PendingPayment, requested_booking()))
            .await;
        let handler = DeclineBookingHandler::new(fx.bookings.clone(), fx.notifier());

        let err = handler.handle(decline(booking.id, "changed my mind")).await.unwrap_err();

        assert!(matches!(err, BookingError::InvalidTransition { .. }));
        let stored = fx.reload(booking.id).await;
        assert_eq!(stored.status, BookingStatus::PendingPayment);
        assert!(stored.rejection_reason.is_none());
    }
}
