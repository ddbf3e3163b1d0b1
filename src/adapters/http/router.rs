//! Application router.

use std::time::Duration;

use axum::http::HeaderName;
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::booking::{booking_routes, BookingAppState};
use super::entitlement::{entitlement_routes, EntitlementAppState};
use super::health::health_routes;
use super::webhook::{webhook_routes, WebhookAppState};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// State of every module router.
#[derive(Clone)]
pub struct AppState {
    pub bookings: BookingAppState,
    pub webhooks: WebhookAppState,
    pub entitlements: EntitlementAppState,
}

/// Builds the full API with tracing, request ids and a request timeout.
///
/// # Example
///
/// ```ignore
/// let app = app_router(state, Duration::from_secs(30));
/// axum::serve(listener, app).await?;
/// ```
pub fn app_router(state: AppState, request_timeout: Duration) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(health_routes())
        .merge(booking_routes().with_state(state.bookings))
        .merge(webhook_routes().with_state(state.webhooks))
        .merge(entitlement_routes().with_state(state.entitlements))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::adapters::http::identity::SystemToken;
    use crate::adapters::memory::{InMemoryBookingRepository, InMemoryPostRepository};
    use crate::adapters::notifications::RecordingNotificationSender;
    use crate::application::handlers::subscription::test_support::Harness;

    fn state() -> AppState {
        let harness = Harness::new();
        AppState {
            bookings: BookingAppState {
                booking_repository: Arc::new(InMemoryBookingRepository::new()),
                post_repository: Arc::new(InMemoryPostRepository::new()),
                notification_sender: Arc::new(RecordingNotificationSender::new()),
                system_token: SystemToken::default(),
            },
            webhooks: WebhookAppState {
                ingest: Arc::new(harness.ingest()),
            },
            entitlements: EntitlementAppState {
                entitlements: harness.entitlements.clone(),
            },
        }
    }

    #[tokio::test]
    async fn health_is_live_and_tagged_with_request_id() {
        let app = app_router(state(), Duration::from_secs(5));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = app_router(state(), Duration::from_secs(5));

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn every_module_is_mounted() {
        let app = app_router(state(), Duration::from_secs(5));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/webhooks/subscription")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
