//! Notification adapters for booking participants.

mod logging;
mod recording;

pub use logging::LoggingNotificationSender;
pub use recording::RecordingNotificationSender;
