//! Resources fetched from the payment authority.
//!
//! Only the fields reconciliation reads are modelled; everything else in
//! the authority's payload is ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Operation type of recurring subscription charges.
pub const RECURRING_PAYMENT: &str = "recurring_payment";

/// `GET /v1/payments/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityPayment {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub status_detail: Option<String>,
    #[serde(default)]
    pub operation_type: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub transaction_amount: Option<f64>,
    #[serde(default)]
    pub currency_id: Option<String>,
    #[serde(default)]
    pub card: Option<AuthorityCard>,
}

impl AuthorityPayment {
    pub fn is_recurring(&self) -> bool {
        self.operation_type.as_deref() == Some(RECURRING_PAYMENT)
    }

    /// Transaction amount in minor units.
    pub fn amount_minor_units(&self) -> i64 {
        self.transaction_amount
            .map(|amount| (amount * 100.0).round() as i64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityCard {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub last_four_digits: Option<String>,
}

/// `GET /preapproval/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityPreapproval {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
