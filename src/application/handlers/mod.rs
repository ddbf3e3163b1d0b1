//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod booking;
pub mod entitlement;
pub mod subscription;

pub use booking::{
    AcceptBookingCommand, AcceptBookingHandler, CancelBookingCommand, CancelBookingHandler,
    CancelBookingResult, CompleteBookingCommand, CompleteBookingHandler, DeclineBookingCommand,
    DeclineBookingHandler, MarkBookingPaidCommand, MarkBookingPaidHandler,
};
pub use entitlement::{
    CheckPermissionHandler, CheckPermissionQuery, EntitlementCache, EntitlementCacheConfig,
    ReconcileEntitlementsCommand, ReconcileEntitlementsHandler,
};
pub use subscription::{
    IngestWebhookCommand, IngestWebhookHandler, IngestWebhookResult, PaymentReconciliation,
    PreapprovalReconciliation, ReconcilePaymentCommand, ReconcilePaymentHandler,
    ReconcilePreapprovalCommand, ReconcilePreapprovalHandler,
};
