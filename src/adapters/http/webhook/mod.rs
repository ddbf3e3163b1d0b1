//! HTTP adapter for payment-authority webhooks.
//!
//! - `POST /webhooks/subscription` - Ingest a notification
//! - `GET /webhooks/subscription` - Endpoint status check

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{WebhookApiError, WebhookAppState};
pub use routes::webhook_routes;
