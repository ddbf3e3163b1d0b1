//! Booking domain module.
//!
//! # Module Structure
//!
//! - `aggregate` - Booking aggregate and party types
//! - `status` - BookingStatus state machine
//! - `cancellation` - Cancellation tiers and penalty computation
//! - `notification` - Messages emitted after committed transitions
//! - `errors` - BookingError

mod aggregate;
mod cancellation;
mod errors;
mod notification;
mod status;

pub use aggregate::{required_reason, Booking, CancellingParty, NewBooking};
pub use cancellation::{
    compute_penalty, select_policy, validate_policies, CancellationPolicy, PenaltyRule,
    ANY_TIME_BEFORE_START,
};
pub use errors::BookingError;
pub use notification::BookingNotification;
pub use status::BookingStatus;
