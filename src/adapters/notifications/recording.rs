//! Notification sender that keeps every notification in memory.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::booking::BookingNotification;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::NotificationSender;

/// Records notifications for assertions. Can be switched to fail every send.
#[derive(Clone, Default)]
pub struct RecordingNotificationSender {
    sent: Arc<Mutex<Vec<BookingNotification>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent send fail.
    pub fn failing() -> Self {
        let sender = Self::default();
        *sender.failing.lock().unwrap_or_else(|p| p.into_inner()) = true;
        sender
    }

    pub fn sent(&self) -> Vec<BookingNotification> {
        self.sent.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn send(&self, notification: &BookingNotification) -> Result<(), DomainError> {
        if *self.failing.lock().unwrap_or_else(|p| p.into_inner()) {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                "Notification channel unavailable",
            ));
        }
        self.sent
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(notification.clone());
        Ok(())
    }
}
