//! Subscription handlers.
//!
//! ## Commands
//! - Ingest a payment-authority webhook (dedup, dispatch)
//! - Reconcile an authority payment into the local subscription
//! - Reconcile an authority preapproval into the local subscription

mod ingest_webhook;
mod reconcile_payment;
mod reconcile_preapproval;

pub use ingest_webhook::{
    IngestWebhookCommand, IngestWebhookHandler, IngestWebhookResult, DEFAULT_DEDUP_TTL,
};
pub use reconcile_payment::{
    PaymentReconciliation, ReconcilePaymentCommand, ReconcilePaymentHandler,
};
pub use reconcile_preapproval::{
    PreapprovalReconciliation, ReconcilePreapprovalCommand, ReconcilePreapprovalHandler,
};

#[cfg(test)]
pub(crate) mod test_support;
