//! MarkBookingPaidHandler - System marks a booking paid after capture.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError};
use crate::domain::foundation::{BookingId, Timestamp};
use crate::ports::{BookingRepository, NotificationSender};

use super::transition::{commit, load};

#[derive(Debug, Clone)]
pub struct MarkBookingPaidCommand {
    pub booking_id: BookingId,
}

pub struct MarkBookingPaidHandler {
    repository: Arc<dyn BookingRepository>,
    notifier: Arc<dyn NotificationSender>,
}

impl MarkBookingPaidHandler {
    pub fn new(
        repository: Arc<dyn BookingRepository>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    pub async fn handle(&self, cmd: MarkBookingPaidCommand) -> Result<Booking, BookingError> {
        let mut booking = load(self.repository.as_ref(), cmd.booking_id).await?;
        let notification = booking.mark_paid(Timestamp::now())?;
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
