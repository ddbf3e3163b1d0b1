//! Webhook envelope parsing and deduplication signatures.
//!
//! The authority posts `{type, action?, data: {id}}`. The envelope only
//! points at a resource; its current state is always fetched back from
//! the authority.

use serde_json::Value;

use super::WebhookError;

/// Resource family named by the envelope's `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookTopic {
    Payment,
    Preapproval,
    Other(String),
}

impl WebhookTopic {
    fn from_type(kind: &str) -> Self {
        match kind {
            "payment" => WebhookTopic::Payment,
            "preapproval" | "subscription_preapproval" => WebhookTopic::Preapproval,
            other => WebhookTopic::Other(other.to_string()),
        }
    }
}

/// A validated webhook envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEnvelope {
    pub kind: String,
    pub action: Option<String>,
    pub resource_id: String,
}

impl WebhookEnvelope {
    /// Parses and validates a raw request body.
    ///
    /// # Errors
    ///
    /// - `ParseError` if the body is not a JSON object
    /// - `MissingField` if `type` or `data.id` is absent or blank
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| WebhookError::ParseError(e.to_string()))?;
        if !value.is_object() {
            return Err(WebhookError::ParseError("expected a JSON object".to_string()));
        }

        let kind = non_blank_text(value.get("type")).ok_or(WebhookError::MissingField("type"))?;
        let resource_id = non_blank_text(value.get("data").and_then(|d| d.get("id")))
            .ok_or(WebhookError::MissingField("data.id"))?;
        let action = non_blank_text(value.get("action"));

        Ok(Self {
            kind,
            action,
            resource_id,
        })
    }

    /// `{type}_{data.id}_{action or "default"}`.
    pub fn signature(&self) -> String {
        format!(
            "{}_{}_{}",
            self.kind,
            self.resource_id,
            self.action.as_deref().unwrap_or("default")
        )
    }

    pub fn topic(&self) -> WebhookTopic {
        WebhookTopic::from_type(&self.kind)
    }
}

fn non_blank_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
