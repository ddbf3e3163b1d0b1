//! HTTP handlers for entitlement endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::entitlement::{
    CheckPermissionHandler, CheckPermissionQuery, EntitlementCache,
};
use crate::domain::entitlement::{EntitlementError, PermissionDecision, UserEntitlements};
use crate::domain::foundation::ErrorCode;

use super::dto::PermissionCheckRequest;
use crate::adapters::http::error::ErrorResponse;
use crate::adapters::http::identity::AuthenticatedUser;

/// Dependencies of the entitlement endpoints.
#[derive(Clone)]
pub struct EntitlementAppState {
    pub entitlements: Arc<EntitlementCache>,
}

impl EntitlementAppState {
    pub fn check_permission_handler(&self) -> CheckPermissionHandler {
        CheckPermissionHandler::new(self.entitlements.clone())
    }
}

/// GET /entitlements
pub async fn get_entitlements(
    State(state): State<EntitlementAppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserEntitlements>, EntitlementApiError> {
    let entitlements = state.entitlements.entitlements_for(&user.user_id).await?;
    Ok(Json(entitlements))
}

/// POST /permissions/check
pub async fn check_permission(
    State(state): State<EntitlementAppState>,
    user: AuthenticatedUser,
    payload: Result<Json<PermissionCheckRequest>, JsonRejection>,
) -> Result<Json<PermissionDecision>, EntitlementApiError> {
    let Json(request) = payload.map_err(EntitlementApiError::BadRequest)?;
    let query = CheckPermissionQuery {
        user_id: user.user_id,
        action: request.action,
    };
    let decision = state.check_permission_handler().handle(query).await?;
    Ok(Json(decision))
}

/// API error type that converts entitlement errors to HTTP responses.
#[derive(Debug)]
pub enum EntitlementApiError {
    Entitlement(EntitlementError),
    BadRequest(JsonRejection),
}

impl From<EntitlementError> for EntitlementApiError {
    fn from(err: EntitlementError) -> Self {
        Self::Entitlement(err)
    }
}

impl IntoResponse for EntitlementApiError {
    fn into_response(self) -> Response {
        let err = match self {
            EntitlementApiError::BadRequest(rejection) => {
                return ErrorResponse::new(ErrorCode::ValidationFailed, rejection.body_text())
                    .into_response_with(StatusCode::BAD_REQUEST);
            }
            EntitlementApiError::Entitlement(err) => err,
        };

        let status = match &err {
            EntitlementError::UserNotFound(_) => StatusCode::NOT_FOUND,
            EntitlementError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            EntitlementError::Cache(_) | EntitlementError::Infrastructure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let mut response = ErrorResponse::new(err.code(), err.message()).into_response_with(status);
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}
