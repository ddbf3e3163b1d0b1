//! Response bodies for the webhook endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Acknowledgement of a delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookReceivedResponse {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<bool>,
}

impl WebhookReceivedResponse {
    pub fn received() -> Self {
        Self {
            received: true,
            duplicate: None,
        }
    }

    pub fn duplicate() -> Self {
        Self {
            received: true,
            duplicate: Some(true),
        }
    }
}

/// Body of the `GET` status check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookStatusResponse {
    pub message: String,
    pub status: String,
    pub timestamp: Timestamp,
}

impl WebhookStatusResponse {
    pub fn active() -> Self {
        Self {
            message: "Subscription webhook endpoint is ready".to_string(),
            status: "active".to_string(),
            timestamp: Timestamp::now(),
        }
    }
}
