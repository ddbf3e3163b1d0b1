//! HTTP handlers for the webhook endpoint.
//!
//! The authority redelivers on any 5xx, so only transient failures map to
//! 500. Events that cannot be applied are acknowledged with 200.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::handlers::subscription::{
    IngestWebhookCommand, IngestWebhookHandler, IngestWebhookResult,
};
use crate::domain::foundation::ErrorCode;
use crate::domain::subscription::WebhookError;

use super::dto::{WebhookReceivedResponse, WebhookStatusResponse};
use crate::adapters::http::error::ErrorResponse;

/// Dependencies of the webhook endpoint.
#[derive(Clone)]
pub struct WebhookAppState {
    pub ingest: Arc<IngestWebhookHandler>,
}

/// POST /webhooks/subscription
pub async fn receive_webhook(
    State(state): State<WebhookAppState>,
    body: Bytes,
) -> Result<Json<WebhookReceivedResponse>, WebhookApiError> {
    let cmd = IngestWebhookCommand {
        body: body.to_vec(),
    };
    let response = match state.ingest.handle(cmd).await? {
        IngestWebhookResult::Duplicate { .. } => WebhookReceivedResponse::duplicate(),
        IngestWebhookResult::Processed { .. } | IngestWebhookResult::Ignored { .. } => {
            WebhookReceivedResponse::received()
        }
    };
    Ok(Json(response))
}

/// GET /webhooks/subscription
pub async fn webhook_status() -> Json<WebhookStatusResponse> {
    Json(WebhookStatusResponse::active())
}

/// API error type that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status == StatusCode::OK {
            return Json(WebhookReceivedResponse::received()).into_response();
        }
        let code = match &self.0 {
            WebhookError::ParseError(_) | WebhookError::MissingField(_) => {
                ErrorCode::ValidationFailed
            }
            WebhookError::Authority(_) => ErrorCode::ExternalAuthorityError,
            WebhookError::Conflict(_) => ErrorCode::ConcurrentModification,
            WebhookError::Database(_) => ErrorCode::DatabaseError,
            WebhookError::StorageError(_) => ErrorCode::CacheError,
            WebhookError::Ignored(_) => ErrorCode::InternalError,
        };
        ErrorResponse::new(code, self.0.to_string()).into_response_with(status)
    }
}
