//! Axum router configuration for the webhook endpoint.

use axum::routing::get;
use axum::Router;

use super::handlers::{receive_webhook, webhook_status, WebhookAppState};

/// Create the webhook router.
///
/// No caller identity is required; the payload is only a pointer and the
/// resource is always re-read from the authority.
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route(
        "/webhooks/subscription",
        get(webhook_status).post(receive_webhook),
    )
}
