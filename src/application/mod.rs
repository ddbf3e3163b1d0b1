//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers mutate bookings, subscriptions and roles; query handlers
//! read cached entitlements.

pub mod handlers;

pub use handlers::{
    // Booking lifecycle
    AcceptBookingHandler, CancelBookingHandler, CompleteBookingHandler, DeclineBookingHandler,
    MarkBookingPaidHandler,
    // Subscription reconciliation
    IngestWebhookHandler, ReconcilePaymentHandler, ReconcilePreapprovalHandler,
    // Entitlements
    CheckPermissionHandler, EntitlementCache, ReconcileEntitlementsHandler,
};
