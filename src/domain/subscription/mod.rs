//! Subscription domain module.
//!
//! Local mirror of the payment authority's subscriptions and payments.
//!
//! # Module Structure
//!
//! - `aggregate` - Subscription aggregate and its audit metadata
//! - `status` - SubscriptionStatus state machine
//! - `payment` - PaymentRecord with forward-only status
//! - `plan` - Plans and quotas
//! - `reference` - `subscription_{plan}_{user}` external reference
//! - `authority` - Resources fetched from the authority
//! - `webhook` - Envelope parsing and dedup signature

mod aggregate;
mod authority;
mod errors;
mod payment;
mod plan;
mod reference;
mod status;
mod webhook;
mod webhook_errors;

pub use aggregate::{Subscription, SubscriptionMetadata, Transition};
pub use authority::{AuthorityCard, AuthorityPayment, AuthorityPreapproval, RECURRING_PAYMENT};
pub use errors::SubscriptionError;
pub use payment::{PaymentAction, PaymentRecord, PaymentStatus, RecordOutcome};
pub use plan::{BillingCycle, Plan};
pub use reference::ExternalReference;
pub use status::SubscriptionStatus;
pub use webhook::{WebhookEnvelope, WebhookTopic};
pub use webhook_errors::WebhookError;
