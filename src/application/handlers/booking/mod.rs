//! Booking handlers.
//!
//! Every transition loads the booking, applies the domain operation, writes
//! it back with a compare-and-swap on `version`, then sends the resulting
//! notification. Notification failures are logged and never undo the write.
//!
//! ## Commands
//! - Accept / decline a requested booking (owner)
//! - Mark a booking paid after capture (system)
//! - Cancel a pending or paid booking (client or publisher)
//! - Complete a paid booking once its service elapsed (system)

mod accept_booking;
mod cancel_booking;
mod complete_booking;
mod decline_booking;
mod mark_booking_paid;
mod transition;

pub use accept_booking::{AcceptBookingCommand, AcceptBookingHandler};
pub use cancel_booking::{CancelBookingCommand, CancelBookingHandler, CancelBookingResult};
pub use complete_booking::{CompleteBookingCommand, CompleteBookingHandler};
pub use decline_booking::{DeclineBookingCommand, DeclineBookingHandler};
pub use mark_booking_paid::{MarkBookingPaidCommand, MarkBookingPaidHandler};

#[cfg(test)]
pub(crate) mod test_support;
