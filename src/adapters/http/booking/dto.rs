//! Request and response bodies for booking endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::booking::{Booking, BookingStatus, CancellingParty};
use crate::domain::foundation::{BookingId, PostId, Timestamp, UserId};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /bookings/:id/decline`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclineBookingRequest {
    #[serde(default)]
    pub rejection_reason: String,
}

/// Body of `POST /bookings/:id/cancel`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBookingRequest {
    pub cancelled_by: CancellingParty,
    #[serde(default)]
    pub cancellation_reason: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Booking view returned by every transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<CancellingParty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty_amount: Option<i64>,
    pub updated_at: Timestamp,
    pub version: u64,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            client_id: b.client_id,
            owner_id: b.owner_id,
            post_id: b.post_id,
            status: b.status,
            total_amount: b.total_amount,
            currency: b.currency,
            start_date: b.start_date,
            end_date: b.end_date,
            guest_count: b.guest_count,
            rejection_reason: b.rejection_reason,
            cancellation_reason: b.cancellation_reason,
            cancelled_by: b.cancelled_by,
            penalty_amount: b.penalty_amount,
            updated_at: b.updated_at,
            version: b.version,
        }
    }
}

/// Body returned by `POST /bookings/:id/cancel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBookingResponse {
    pub penalty_amount: i64,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_request_reads_camel_case() {
        let req: CancelBookingRequest = serde_json::from_value(serde_json::json!({
            "cancelledBy": "publisher",
            "cancellationReason": "storm warning"
        }))
        .unwrap();
        assert_eq!(req.cancelled_by, CancellingParty::Publisher);
        assert_eq!(req.cancellation_reason, "storm warning");
    }

    #[test]
    fn decline_request_tolerates_missing_reason() {
        let req: DeclineBookingRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.rejection_reason.is_empty());
    }

    #[test]
    fn cancel_response_uses_camel_case() {
        let body = CancelBookingResponse {
            penalty_amount: 500,
            currency: "ARS".to_string(),
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({"penaltyAmount": 500, "currency": "ARS"})
        );
    }
}
