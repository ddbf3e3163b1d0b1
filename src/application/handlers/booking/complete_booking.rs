//! CompleteBookingHandler - Closes a paid booking once its service elapsed.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError};
use crate::domain::foundation::{BookingId, Timestamp};
use crate::ports::{BookingRepository, NotificationSender};

use super::transition::{commit, load};

#[derive(Debug, Clone)]
pub struct CompleteBookingCommand {
    pub booking_id: BookingId,
}

pub struct CompleteBookingHandler {
    repository: Arc<dyn BookingRepository>,
    notifier: Arc<dyn NotificationSender>,
}

impl CompleteBookingHandler {
    pub fn new(
        repository: Arc<dyn BookingRepository>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    pub async fn handle(&self, cmd: CompleteBookingCommand) -> Result<Booking, BookingError> {
        self.handle_at(cmd, Timestamp::now()).await
    }

    /// Completes as of `now`; the scheduler passes the instant it observed.
    pub async fn handle_at(
        &self,
        cmd: CompleteBookingCommand,
        now: Timestamp,
    ) -> Result<Booking, BookingError> {
        let mut booking = load(self.repository.as_ref(), cmd.booking_id).await?;
        let notification = booking.complete(now)?;
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
        booking_in, requested_booking, Fixture,
    };
    use crate::domain::booking::BookingStatus;

    #[tokio::test]
    async fn paid_booking_completes_after_end_date() {
        let fx = Fixture::new();
        let booking = fx
            .store(booking_in(BookingStatus::Paid, requested_booking()))
            .await;
        let handler = CompleteBookingHandler::new(fx.bookings.clone(), fx.notifier());

        let completed = handler
            .handle_at(
                CompleteBookingCommand {
                    booking_id: booking.id,
                },
                booking.end_date.plus_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(completed.status, BookingStatus::Completed);
        assert!(completed.completed_at.is_some());
    }

    #[tokio::test]
    async fn completion_before_end_date_is_refused() {
        let fx = Fixture::new();
        let booking = fx
            .store(booking_in(BookingStatus::Paid, requested_booking()))
            .await;
        let handler = CompleteBookingHandler::new(fx.bookings.clone(), fx.notifier());

        let err = handler
            .handle(CompleteBookingCommand {
                booking_id: booking.id,
            })
            .await
            .unwrap_err();

        assert_eq!(err, BookingError::ServiceNotElapsed(booking.id));
        assert_eq!(fx.reload(booking.id).await.status, BookingStatus::Paid);
    }

    #[tokio::test]
    async fn declined_booking_never_completes() {
        let fx = Fixture::new();
        let booking = fx
            .store(booking_in(BookingStatus::Declined, requested_booking()))
            .await;
        let handler = CompleteBookingHandler::new(fx.bookings.clone(), fx.notifier());

        let err = handler
            .handle_at(
                CompleteBookingCommand {
                    booking_id: booking.id,
                },
                booking.end_date.add_days(1),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::InvalidTransition { .. }));
    }
}
