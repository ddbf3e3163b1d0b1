//! HTTP handlers for booking endpoints.
//!
//! These handlers connect Axum routes to the booking command handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::handlers::booking::{
    AcceptBookingCommand, AcceptBookingHandler, CancelBookingCommand, CancelBookingHandler,
    CompleteBookingCommand, CompleteBookingHandler, DeclineBookingCommand, DeclineBookingHandler,
    MarkBookingPaidCommand, MarkBookingPaidHandler,
};
use crate::domain::booking::BookingError;
use crate::domain::foundation::BookingId;
use crate::ports::{BookingRepository, NotificationSender, PostRepository};

use super::dto::{
    BookingResponse, CancelBookingRequest, CancelBookingResponse, DeclineBookingRequest,
};
use crate::adapters::http::error::ErrorResponse;
use crate::adapters::http::identity::{AuthenticatedUser, SystemCaller, SystemToken};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Dependencies of the booking endpoints.
#[derive(Clone)]
pub struct BookingAppState {
    pub booking_repository: Arc<dyn BookingRepository>,
    pub post_repository: Arc<dyn PostRepository>,
    pub notification_sender: Arc<dyn NotificationSender>,
    pub system_token: SystemToken,
}

impl FromRef<BookingAppState> for SystemToken {
    fn from_ref(state: &BookingAppState) -> Self {
        state.system_token.clone()
    }
}

impl BookingAppState {
    pub fn accept_handler(&self) -> AcceptBookingHandler {
        AcceptBookingHandler::new(
            self.booking_repository.clone(),
            self.notification_sender.clone(),
        )
    }

    pub fn decline_handler(&self) -> DeclineBookingHandler {
        DeclineBookingHandler::new(
            self.booking_repository.clone(),
            self.notification_sender.clone(),
        )
    }

    pub fn cancel_handler(&self) -> CancelBookingHandler {
        CancelBookingHandler::new(
            self.booking_repository.clone(),
            self.post_repository.clone(),
            self.notification_sender.clone(),
        )
    }

    pub fn mark_paid_handler(&self) -> MarkBookingPaidHandler {
        MarkBookingPaidHandler::new(
            self.booking_repository.clone(),
            self.notification_sender.clone(),
        )
    }

    pub fn complete_handler(&self) -> CompleteBookingHandler {
        CompleteBookingHandler::new(
            self.booking_repository.clone(),
            self.notification_sender.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Owner transitions
// ════════════════════════════════════════════════════════════════════════════════

/// POST /bookings/:id/accept
pub async fn accept_booking(
    State(state): State<BookingAppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, BookingApiError> {
    let cmd = AcceptBookingCommand {
        booking_id: parse_booking_id(&id)?,
        actor: user.user_id,
    };
    let booking = state.accept_handler().handle(cmd).await?;
    Ok(Json(booking.into()))
}

/// POST /bookings/:id/decline
pub async fn decline_booking(
    State(state): State<BookingAppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<DeclineBookingRequest>, JsonRejection>,
) -> Result<Json<BookingResponse>, BookingApiError> {
    let Json(request) = payload.map_err(body_error)?;
    let cmd = DeclineBookingCommand {
        booking_id: parse_booking_id(&id)?,
        actor: user.user_id,
        reason: request.rejection_reason,
    };
    let booking = state.decline_handler().handle(cmd).await?;
    Ok(Json(booking.into()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Party transitions
// ════════════════════════════════════════════════════════════════════════════════

/// POST /bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<BookingAppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<CancelBookingRequest>, JsonRejection>,
) -> Result<Json<CancelBookingResponse>, BookingApiError> {
    let Json(request) = payload.map_err(body_error)?;
    let cmd = CancelBookingCommand {
        booking_id: parse_booking_id(&id)?,
        actor: user.user_id,
        party: request.cancelled_by,
        reason: request.cancellation_reason,
    };
    let result = state.cancel_handler().handle(cmd).await?;
    Ok(Json(CancelBookingResponse {
        penalty_amount: result.penalty_amount,
        currency: result.currency,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// System transitions
// ════════════════════════════════════════════════════════════════════════════════

/// POST /bookings/:id/payment-captured
pub async fn payment_captured(
    _caller: SystemCaller,
    State(state): State<BookingAppState>,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, BookingApiError> {
    let cmd = MarkBookingPaidCommand {
        booking_id: parse_booking_id(&id)?,
    };
    let booking = state.mark_paid_handler().handle(cmd).await?;
    Ok(Json(booking.into()))
}

/// POST /bookings/:id/complete
pub async fn complete_booking(
    _caller: SystemCaller,
    State(state): State<BookingAppState>,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, BookingApiError> {
    let cmd = CompleteBookingCommand {
        booking_id: parse_booking_id(&id)?,
    };
    let booking = state.complete_handler().handle(cmd).await?;
    Ok(Json(booking.into()))
}

fn parse_booking_id(raw: &str) -> Result<BookingId, BookingApiError> {
    raw.parse::<BookingId>()
        .map_err(|_| BookingError::validation("booking_id", "must be a UUID").into())
}

fn body_error(rejection: JsonRejection) -> BookingApiError {
    BookingError::validation("body", rejection.body_text()).into()
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts booking errors to HTTP responses.
#[derive(Debug)]
pub struct BookingApiError(BookingError);

impl From<BookingError> for BookingApiError {
    fn from(err: BookingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BookingApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Forbidden { .. } => StatusCode::FORBIDDEN,
            BookingError::InvalidTransition { .. }
            | BookingError::ServiceNotElapsed(_)
            | BookingError::ConcurrentModification(_) => StatusCode::CONFLICT,
            BookingError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            BookingError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ErrorResponse::new(self.0.code(), self.0.message()).into_response_with(status)
    }
}
