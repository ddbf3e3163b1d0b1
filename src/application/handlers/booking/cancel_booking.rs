//! CancelBookingHandler - Client or publisher cancels a booking.

use std::sync::Arc;

use crate::domain::booking::{required_reason, Booking, BookingError, CancellingParty};
use crate::domain::foundation::{BookingId, Timestamp, UserId};
use crate::ports::{BookingRepository, NotificationSender, PostRepository};

use super::transition::{commit, load};

#[derive(Debug, Clone)]
pub struct CancelBookingCommand {
    pub booking_id: BookingId,
    pub actor: UserId,
    pub party: CancellingParty,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct CancelBookingResult {
    pub booking: Booking,
    pub penalty_amount: i64,
    pub currency: String,
}

/// Cancels a pending or paid booking, charging the post's penalty tier.
pub struct CancelBookingHandler {
    repository: Arc<dyn BookingRepository>,
    posts: Arc<dyn PostRepository>,
    notifier: Arc<dyn NotificationSender>,
}

impl CancelBookingHandler {
    pub fn new(
        repository: Arc<dyn BookingRepository>,
        posts: Arc<dyn PostRepository>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            repository,
            posts,
            notifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelBookingCommand,
    ) -> Result<CancelBookingResult, BookingError> {
        let reason = required_reason("cancellation_reason", &cmd.reason)?;

        let mut booking = load(self.repository.as_ref(), cmd.booking_id).await?;
        let policies = self.posts.cancellation_policies(&booking.post_id).await?;

        let notification =
            booking.cancel(&cmd.actor, cmd.party, &reason, &policies, Timestamp::now())?;
        commit(
            self.repository.as_ref(),
            self.notifier.as_ref(),
            &mut booking,
            notification,
        )
        .await?;

        let penalty_amount = booking.penalty_amount.unwrap_or(0);
        tracing::info!(
            booking_id = %booking.id,
            cancelled_by = cmd.party.as_str(),
            penalty_amount,
            "Booking cancelled"
        );

        let currency = booking.currency.clone();
        Ok(CancelBookingResult {
            booking,
            penalty_amount,
            currency,
        })
    }
}
