//! Notifications emitted by booking transitions.

use serde::Serialize;

use crate::domain::foundation::{BookingId, UserId};

use super::CancellingParty;

/// A message to one participant of a booking, sent after the transition
/// has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingNotification {
    Accepted {
        booking_id: BookingId,
        recipient: UserId,
    },
    Declined {
        booking_id: BookingId,
        recipient: UserId,
        reason: String,
    },
    Paid {
        booking_id: BookingId,
        recipient: UserId,
    },
    Cancelled {
        booking_id: BookingId,
        recipient: UserId,
        cancelled_by: CancellingParty,
        penalty_amount: i64,
        currency: String,
    },
    Completed {
        booking_id: BookingId,
        recipient: UserId,
    },
}

impl BookingNotification {
    /// User the notification is addressed to.
    pub fn recipient(&self) -> &UserId {
        match self {
            BookingNotification::Accepted { recipient, .. }
            | BookingNotification::Declined { recipient, .. }
            | BookingNotification::Paid { recipient, .. }
            | BookingNotification::Cancelled { recipient, .. }
            | BookingNotification::Completed { recipient, .. } => recipient,
        }
    }

    pub fn booking_id(&self) -> BookingId {
        match self {
            BookingNotification::Accepted { booking_id, .. }
            | BookingNotification::Declined { booking_id, .. }
            | BookingNotification::Paid { booking_id, .. }
            | BookingNotification::Cancelled { booking_id, .. }
            | BookingNotification::Completed { booking_id, .. } => *booking_id,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BookingNotification::Accepted { .. } => "booking_accepted",
            BookingNotification::Declined { .. } => "booking_declined",
            BookingNotification::Paid { .. } => "booking_paid",
            BookingNotification::Cancelled { .. } => "booking_cancelled",
            BookingNotification::Completed { .. } => "booking_completed",
        }
    }
}
