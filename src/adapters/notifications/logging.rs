//! Notification sender that writes each notification to the log.
//!
//! Stands in for the email/push collaborator, which lives outside this
//! service.

use async_trait::async_trait;

use crate::domain::booking::BookingNotification;
use crate::domain::foundation::DomainError;
use crate::ports::NotificationSender;

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotificationSender;

impl LoggingNotificationSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSender for LoggingNotificationSender {
    async fn send(&self, notification: &BookingNotification) -> Result<(), DomainError> {
        tracing::info!(
            kind = notification.kind(),
            booking_id = %notification.booking_id(),
            recipient = %notification.recipient(),
            "Booking notification queued"
        );
        Ok(())
    }
}
