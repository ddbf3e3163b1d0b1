//! Load / commit / notify steps shared by the booking handlers.

use crate::domain::booking::{Booking, BookingError, BookingNotification};
use crate::domain::foundation::{BookingId, DomainError, ErrorCode};
use crate::ports::{BookingRepository, NotificationSender};

pub(super) async fn load(
    repository: &dyn BookingRepository,
    id: BookingId,
) -> Result<Booking, BookingError> {
    repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| BookingError::not_found(id))
}

/// Writes `booking` back and sends `notification` once the write succeeded.
pub(super) async fn commit(
    repository: &dyn BookingRepository,
    notifier: &dyn NotificationSender,
    booking: &mut Booking,
    notification: BookingNotification,
) -> Result<(), BookingError> {
    let version = repository
        .update(booking)
        .await
        .map_err(|e| write_error(booking.id, e))?;
    booking.version = version;

    tracing::info!(
        booking_id = %booking.id,
        status = %booking.status,
        version,
        "Booking transitioned"
    );

    if let Err(e) = notifier.send(&notification).await {
        tracing::warn!(
            booking_id = %booking.id,
            kind = notification.kind(),
            error = %e,
            "Failed to send booking notification"
        );
    }
    Ok(())
}

fn write_error(id: BookingId, err: DomainError) -> BookingError {
    match err.code {
        ErrorCode::ConcurrentModification => {
            tracing::info!(booking_id = %id, "Lost booking compare-and-swap");
            BookingError::ConcurrentModification(id)
        }
        ErrorCode::BookingNotFound => BookingError::not_found(id),
        _ => BookingError::from(err),
    }
}
