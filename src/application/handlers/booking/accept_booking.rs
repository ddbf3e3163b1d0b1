//! AcceptBookingHandler - Owner accepts a requested booking.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError};
use crate::domain::foundation::{BookingId, Timestamp, UserId};
use crate::ports::{BookingRepository, NotificationSender};

use super::transition::{commit, load};

#[derive(Debug, Clone)]
pub struct AcceptBookingCommand {
    pub booking_id: BookingId,
    pub actor: UserId,
}

/// Moves `requested → pending_payment` and tells the client to pay.
pub struct AcceptBookingHandler {
    repository: Arc<dyn BookingRepository>,
    notifier: Arc<dyn NotificationSender>,
}

impl AcceptBookingHandler {
    pub fn new(
        repository: Arc<dyn BookingRepository>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    pub async fn handle(&self, cmd: AcceptBookingCommand) -> Result<Booking, BookingError> {
        let mut booking = load(self.repository.as_ref(), cmd.booking_id).await?;
        let notification = booking.accept(&cmd.actor, Timestamp::now())?;
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
        client, owner, requested_booking, Fixture,
    };
    use crate::domain::booking::{BookingNotification, BookingStatus};

    #[tokio::test]
    async fn owner_accepts_requested_booking() {
        let fx = Fixture::new();
        let booking = fx.store(requested_booking()).await;
        let handler = AcceptBookingHandler::new(fx.bookings.clone(), fx.notifier());

        let accepted = handler
            .handle(AcceptBookingCommand {
                booking_id: booking.id,
                actor: owner(),
            })
            .await
            .unwrap();

        assert_eq!(accepted.status, BookingStatus::PendingPayment);
        assert!(accepted.accepted_at.is_some());
        assert_eq!(accepted.version, 1);
        assert!(matches!(
            fx.sender.sent().as_slice(),
            [BookingNotification::Accepted { recipient, .. }] if *recipient == client()
        ));
    }

    #[tokio::test]
    async fn client_cannot_accept() {
        let fx = Fixture::new();
        let booking = fx.store(requested_booking()).await;
        let handler = AcceptBookingHandler::new(fx.bookings.clone(), fx.notifier());

        let err = handler
            .handle(AcceptBookingCommand {
                booking_id: booking.id,
                actor: client(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::Forbidden { .. }));
        assert_eq!(fx.reload(booking.id).await.status, BookingStatus::Requested);
        assert!(fx.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let fx = Fixture::new();
        let handler = AcceptBookingHandler::new(fx.bookings.clone(), fx.notifier());

        let err = handler
            .handle(AcceptBookingCommand {
                booking_id: BookingId::new(),
                actor: owner(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_accepts_have_one_winner() {
        let fx = Fixture::new();
        let booking = fx.store(requested_booking()).await;
        let handler = Arc::new(AcceptBookingHandler::new(fx.bookings.clone(), fx.notifier()));

        let cmd = AcceptBookingCommand {
            booking_id: booking.id,
            actor: owner(),
        };
        let (a, b) = tokio::join!(handler.handle(cmd.clone()), handler.handle(cmd));

        let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        let loser = if a.is_err() { a } else { b };
        assert!(matches!(
            loser,
            Err(BookingError::ConcurrentModification(_)) | Err(BookingError::InvalidTransition { .. })
        ));
        assert_eq!(fx.reload(booking.id).await.version, 1);
        assert_eq!(fx.sender.sent().len(), 1);
    }

    #[tokio::test]
    async fn failed_notification_keeps_transition() {
        let fx = Fixture::with_failing_notifier();
        let booking = fx.store(requested_booking()).await;
        let handler = AcceptBookingHandler::new(fx.bookings.clone(), fx.notifier());

        handler
            .handle(AcceptBookingCommand {
                booking_id: booking.id,
                actor: owner(),
            })
            .await
            .unwrap();

        assert_eq!(fx.reload(booking.id).await.status, BookingStatus::PendingPayment);
    }
}
