//! IngestWebhookHandler - Entry point for payment-authority notifications.
//!
//! # Flow
//!
//! 1. Parse and validate the envelope
//! 2. Claim its signature in the dedup cache (atomic check-and-set)
//! 3. Dispatch by topic to payment or preapproval reconciliation
//!
//! Retryable failures release the signature so the authority's redelivery
//! is processed. Everything else is acknowledged.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{
    SubscriptionError, WebhookEnvelope, WebhookError, WebhookTopic,
};
use crate::ports::KeyValueCache;

use super::{
    ReconcilePaymentCommand, ReconcilePaymentHandler, ReconcilePreapprovalCommand,
    ReconcilePreapprovalHandler,
};

/// Default lifetime of a dedup signature.
pub const DEFAULT_DEDUP_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct IngestWebhookCommand {
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestWebhookResult {
    /// Dispatched and reconciled.
    Processed { signature: String },
    /// Signature already seen within the TTL.
    Duplicate { signature: String },
    /// Acknowledged without a state change.
    Ignored { signature: String, reason: String },
}

impl IngestWebhookResult {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, IngestWebhookResult::Duplicate { .. })
    }
}

pub struct IngestWebhookHandler {
    dedup: Arc<dyn KeyValueCache>,
    payments: Arc<ReconcilePaymentHandler>,
    preapprovals: Arc<ReconcilePreapprovalHandler>,
    dedup_ttl: Duration,
}

impl IngestWebhookHandler {
    pub fn new(
        dedup: Arc<dyn KeyValueCache>,
        payments: Arc<ReconcilePaymentHandler>,
        preapprovals: Arc<ReconcilePreapprovalHandler>,
    ) -> Self {
        Self {
            dedup,
            payments,
            preapprovals,
            dedup_ttl: DEFAULT_DEDUP_TTL,
        }
    }

    pub fn with_dedup_ttl(mut self, ttl: Duration) -> Self {
        self.dedup_ttl = ttl;
        self
    }

    pub async fn handle(
        &self,
        cmd: IngestWebhookCommand,
    ) -> Result<IngestWebhookResult, WebhookError> {
        // 1. Parse
        let envelope = WebhookEnvelope::parse(&cmd.body)?;
        let signature = envelope.signature();

        // 2. Deduplicate
        let received_at = Timestamp::now().as_unix_millis().to_string();
        let first_delivery = self
            .dedup
            .set_if_absent(&signature, &received_at, self.dedup_ttl)
            .await
            .map_err(|e| WebhookError::StorageError(e.to_string()))?;
        if !first_delivery {
            tracing::info!(signature = %signature, "Duplicate webhook suppressed");
            return Ok(IngestWebhookResult::Duplicate { signature });
        }

        // 3. Dispatch
        let outcome = match envelope.topic() {
            WebhookTopic::Payment => self
                .payments
                .handle(ReconcilePaymentCommand {
                    payment_id: envelope.resource_id.clone(),
                })
                .await
                .map(|result| format!("{:?}", result)),
            WebhookTopic::Preapproval => self
                .preapprovals
                .handle(ReconcilePreapprovalCommand {
                    preapproval_id: envelope.resource_id.clone(),
                })
                .await
                .map(|result| format!("{:?}", result)),
            WebhookTopic::Other(kind) => {
                tracing::info!(signature = %signature, kind = %kind, "Ignoring webhook type");
                return Ok(IngestWebhookResult::Ignored {
                    signature,
                    reason: format!("unsupported type {}", kind),
                });
            }
        };

        match outcome {
            Ok(summary) => {
                tracing::info!(signature = %signature, outcome = %summary, "Webhook processed");
                Ok(IngestWebhookResult::Processed { signature })
            }
            Err(err) if err.is_retryable() => Err(self.release(&signature, err).await),
            Err(err) => {
                tracing::info!(signature = %signature, reason = %err, "Webhook dropped");
                Ok(IngestWebhookResult::Ignored {
                    signature,
                    reason: err.message(),
                })
            }
        }
    }

    /// Frees the signature so the redelivered event is processed.
    async fn release(&self, signature: &str, err: SubscriptionError) -> WebhookError {
        tracing::warn!(signature = %signature, error = %err, "Webhook failed, awaiting redelivery");
        if let Err(e) = self.dedup.delete(signature).await {
            tracing::error!(
                signature = %signature,
                error = %e,
                "Failed to release webhook signature"
            );
        }
        WebhookError::from(err)
    }
}
