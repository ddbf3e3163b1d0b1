//! Payment records and their forward-only status progression.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PaymentRecordId, SubscriptionId, Timestamp, UserId};

/// Local payment status. Only ever advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "approved" => Some(PaymentStatus::Approved),
            "rejected" => Some(PaymentStatus::Rejected),
            "cancelled" => Some(PaymentStatus::Cancelled),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    /// Maps the authority's payment status onto the local vocabulary.
    pub fn from_authority(status: &str) -> Option<Self> {
        match status {
            "pending" | "in_process" => Some(PaymentStatus::Pending),
            "approved" => Some(PaymentStatus::Approved),
            "rejected" => Some(PaymentStatus::Rejected),
            "cancelled" => Some(PaymentStatus::Cancelled),
            "refunded" | "charged_back" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    /// `pending -> approved|rejected|cancelled`, `approved -> refunded`.
    pub fn can_advance_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            (Pending, Approved) | (Pending, Rejected) | (Pending, Cancelled) | (Approved, Refunded)
        )
    }
}

/// What a payment event asks the reconciliation engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentAction {
    /// Activate the current subscription or create an active one.
    ActivateOrCreate,
    /// Hold a pending subscription, never regressing an active one.
    PutOnHold,
    /// Cancel the current subscription.
    Cancel,
    /// Persist the payment only.
    RecordOnly,
    /// Unknown status.
    Ignore,
}

impl PaymentAction {
    pub fn for_authority_status(status: &str) -> Self {
        match status {
            "approved" => PaymentAction::ActivateOrCreate,
            "pending" | "in_process" => PaymentAction::PutOnHold,
            "rejected" | "cancelled" => PaymentAction::Cancel,
            "refunded" | "charged_back" => PaymentAction::RecordOnly,
            _ => PaymentAction::Ignore,
        }
    }
}

/// Result of idempotently recording a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First time this external payment id was seen.
    Inserted,
    /// Existing record moved forward.
    Advanced,
    /// Same or older status; nothing changed.
    Unchanged,
}

/// A payment reported by the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentRecordId,
    pub user_id: UserId,
    pub subscription_id: Option<SubscriptionId>,
    pub external_payment_id: String,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub external_status_detail: String,
    pub external_reference: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentRecord {
    /// Folds a newer observation of the same payment into this record.
    ///
    /// Non-advancing observations leave the record untouched.
    pub fn absorb(&mut self, observed: &PaymentRecord, now: Timestamp) -> RecordOutcome {
        if !self.status.can_advance_to(&observed.status) {
            return RecordOutcome::Unchanged;
        }
        self.status = observed.status;
        self.external_status_detail = observed.external_status_detail.clone();
        if self.subscription_id.is_none() {
            self.subscription_id = observed.subscription_id;
        }
        self.updated_at = now;
        RecordOutcome::Advanced
    }
}
