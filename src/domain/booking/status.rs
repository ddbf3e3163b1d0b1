//! Booking status state machine.
//!
//! A booking is requested by a client, accepted or declined by the post
//! owner, paid through the payment authority, and finally either cancelled
//! by one of the parties or completed once the service has elapsed.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created by the client, awaiting the owner's decision.
    Requested,

    /// Accepted by the owner, awaiting payment capture.
    PendingPayment,

    /// Payment captured.
    Paid,

    /// Rejected by the owner. Terminal.
    Declined,

    /// Cancelled by the client or the publisher. Terminal.
    Cancelled,

    /// Service delivered. Terminal.
    Completed,
}

impl BookingStatus {
    /// Stable storage/wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Requested => "requested",
            BookingStatus::PendingPayment => "pending_payment",
            BookingStatus::Paid => "paid",
            BookingStatus::Declined => "declined",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Parses a stored status name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "requested" => Some(BookingStatus::Requested),
            "pending_payment" => Some(BookingStatus::PendingPayment),
            "paid" => Some(BookingStatus::Paid),
            "declined" => Some(BookingStatus::Declined),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    /// Returns true if the booking can still be cancelled by a party.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, BookingStatus::PendingPayment | BookingStatus::Paid)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for BookingStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use BookingStatus::*;
        matches!(
            (self, target),
            // From REQUESTED
            (Requested, PendingPayment)
                | (Requested, Declined)
            // From PENDING_PAYMENT
                | (PendingPayment, Paid)
                | (PendingPayment, Cancelled)
            // From PAID
                | (Paid, Cancelled)
                | (Paid, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use BookingStatus::*;
        match self {
            Requested => vec![PendingPayment, Declined],
            PendingPayment => vec![Paid, Cancelled],
            Paid => vec![Cancelled, Completed],
            Declined | Cancelled | Completed => vec![],
        }
    }
}
