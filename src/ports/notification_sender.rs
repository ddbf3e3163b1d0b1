//! Notification port for booking participants.
//!
//! Delivery is best effort: callers log failures and never roll back the
//! transition that produced the notification.

use async_trait::async_trait;

use crate::domain::booking::BookingNotification;
use crate::domain::foundation::DomainError;

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &BookingNotification) -> Result<(), DomainError>;
}
