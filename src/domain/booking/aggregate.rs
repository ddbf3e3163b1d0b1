//! Booking aggregate.
//!
//! A booking links a client to another user's post for a date range. Every
//! transition is guarded by the `BookingStatus` state machine and, where a
//! party acts, by the actor's role in the booking. Transitions take `now`
//! explicitly so that callers control the clock.
//!
//! # Concurrency
//!
//! `version` is the optimistic-concurrency sequence. Repositories persist a
//! mutated booking only if the stored version still equals the loaded one.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BookingId, PostId, StateMachine, Timestamp, UserId};

use super::{
    compute_penalty, BookingError, BookingNotification, BookingStatus, CancellationPolicy,
};

/// Which party cancelled a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellingParty {
    Client,
    Publisher,
}

impl CancellingParty {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancellingParty::Client => "client",
            CancellingParty::Publisher => "publisher",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "client" => Some(CancellingParty::Client),
            "publisher" => Some(CancellingParty::Publisher),
            _ => None,
        }
    }
}

/// Input for opening a new booking request.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub client_id: UserId,
    pub owner_id: UserId,
    pub post_id: PostId,
    pub total_amount: i64,
    pub currency: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub guest_count: u32,
}

/// Booking aggregate.
///
/// # Invariants
///
/// - `client_id != owner_id`
/// - `guest_count >= 1`
/// - `start_date <= end_date`
/// - terminal statuses never change again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub client_id: UserId,
    pub owner_id: UserId,
    pub post_id: PostId,
    pub status: BookingStatus,
    pub total_amount: i64,
    pub currency: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub guest_count: u32,
    pub rejection_reason: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<CancellingParty>,
    pub penalty_amount: Option<i64>,
    pub accepted_at: Option<Timestamp>,
    pub declined_at: Option<Timestamp>,
    pub paid_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub version: u64,
}

impl Booking {
    /// Opens a booking in `requested`.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` if any aggregate invariant is violated.
    pub fn request(id: BookingId, new: NewBooking, now: Timestamp) -> Result<Self, BookingError> {
        if new.client_id == new.owner_id {
            return Err(BookingError::validation(
                "client_id",
                "a user cannot book their own post",
            ));
        }
        if new.guest_count == 0 {
            return Err(BookingError::validation(
                "guest_count",
                "at least one guest is required",
            ));
        }
        if new.start_date.is_after(&new.end_date) {
            return Err(BookingError::validation(
                "start_date",
                "start date must not be after end date",
            ));
        }
        if new.total_amount < 0 {
            return Err(BookingError::validation(
                "total_amount",
                "total amount must not be negative",
            ));
        }

        Ok(Self {
            id,
            client_id: new.client_id,
            owner_id: new.owner_id,
            post_id: new.post_id,
            status: BookingStatus::Requested,
            total_amount: new.total_amount,
            currency: new.currency,
            start_date: new.start_date,
            end_date: new.end_date,
            guest_count: new.guest_count,
            rejection_reason: None,
            cancellation_reason: None,
            cancelled_by: None,
            penalty_amount: None,
            accepted_at: None,
            declined_at: None,
            paid_at: None,
            cancelled_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Owner accepts the request; the client is asked to pay.
    pub fn accept(
        &mut self,
        actor: &UserId,
        now: Timestamp,
    ) -> Result<BookingNotification, BookingError> {
        self.ensure_owner(actor)?;
        self.transition(BookingStatus::PendingPayment, now)?;
        self.accepted_at = Some(now);
        Ok(BookingNotification::Accepted {
            booking_id: self.id,
            recipient: self.client_id.clone(),
        })
    }

    /// Owner declines the request with a reason.
    pub fn decline(
        &mut self,
        actor: &UserId,
        reason: &str,
        now: Timestamp,
    ) -> Result<BookingNotification, BookingError> {
        let reason = required_reason("rejection_reason", reason)?;
        self.ensure_owner(actor)?;
        self.transition(BookingStatus::Declined, now)?;
        self.rejection_reason = Some(reason.clone());
        self.declined_at = Some(now);
        Ok(BookingNotification::Declined {
            booking_id: self.id,
            recipient: self.client_id.clone(),
            reason,
        })
    }

    /// Payment was captured by the authority.
    pub fn mark_paid(&mut self, now: Timestamp) -> Result<BookingNotification, BookingError> {
        self.transition(BookingStatus::Paid, now)?;
        self.paid_at = Some(now);
        Ok(BookingNotification::Paid {
            booking_id: self.id,
            recipient: self.owner_id.clone(),
        })
    }

    /// One party cancels; the penalty is computed from the post's policies.
    pub fn cancel(
        &mut self,
        actor: &UserId,
        party: CancellingParty,
        reason: &str,
        policies: &[CancellationPolicy],
        now: Timestamp,
    ) -> Result<BookingNotification, BookingError> {
        let reason = required_reason("cancellation_reason", reason)?;
        let party_id = self.party_id(party);
        if actor != party_id {
            return Err(BookingError::forbidden(actor.clone(), party.as_str()));
        }

        let penalty = compute_penalty(policies, self.total_amount, self.start_date, now);
        self.transition(BookingStatus::Cancelled, now)?;
        self.cancelled_by = Some(party);
        self.cancellation_reason = Some(reason);
        self.penalty_amount = Some(penalty);
        self.cancelled_at = Some(now);

        let recipient = match party {
            CancellingParty::Client => self.owner_id.clone(),
            CancellingParty::Publisher => self.client_id.clone(),
        };
        Ok(BookingNotification::Cancelled {
            booking_id: self.id,
            recipient,
            cancelled_by: party,
            penalty_amount: penalty,
            currency: self.currency.clone(),
        })
    }

    /// Service has elapsed; closes a paid booking.
    pub fn complete(&mut self, now: Timestamp) -> Result<BookingNotification, BookingError> {
        if !self.status.can_transition_to(&BookingStatus::Completed) {
            return Err(BookingError::invalid_transition(
                self.status,
                BookingStatus::Completed,
            ));
        }
        if now.is_before(&self.end_date) {
            return Err(BookingError::ServiceNotElapsed(self.id));
        }
        self.transition(BookingStatus::Completed, now)?;
        self.completed_at = Some(now);
        Ok(BookingNotification::Completed {
            booking_id: self.id,
            recipient: self.client_id.clone(),
        })
    }

    /// User id of the given party.
    pub fn party_id(&self, party: CancellingParty) -> &UserId {
        match party {
            CancellingParty::Client => &self.client_id,
            CancellingParty::Publisher => &self.owner_id,
        }
    }

    fn ensure_owner(&self, actor: &UserId) -> Result<(), BookingError> {
        if actor != &self.owner_id {
            return Err(BookingError::forbidden(actor.clone(), "owner"));
        }
        Ok(())
    }

    fn transition(&mut self, target: BookingStatus, now: Timestamp) -> Result<(), BookingError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| BookingError::invalid_transition(self.status, target))?;
        self.updated_at = now;
        Ok(())
    }
}

/// Trims a user-supplied reason, rejecting blank input.
pub fn required_reason(field: &str, reason: &str) -> Result<String, BookingError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(BookingError::validation(field, "reason cannot be empty"));
    }
    Ok(trimmed.to_string())
}
