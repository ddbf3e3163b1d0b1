//! Integration tests for the subscription webhook flow.
//!
//! These tests drive the fully wired router with in-memory adapters:
//! 1. Webhook deliveries are deduplicated by signature
//! 2. Payments and preapprovals reconcile the user's subscription
//! 3. Entitlements follow the subscription (roles, post visibility)

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tourbook::adapters::cache::InMemoryCache;
use tourbook::adapters::http::{app_router, SystemToken};
use tourbook::adapters::memory::{
    InMemoryBookingRepository, InMemoryPaymentRepository, InMemoryPlanRepository,
    InMemoryPostRepository, InMemorySubscriptionRepository, InMemoryUserRepository,
};
use tourbook::adapters::notifications::RecordingNotificationSender;
use tourbook::adapters::payment_authority::MockPaymentAuthority;
use tourbook::bootstrap::{build_state, Repositories};
use tourbook::config::CacheConfig;
use tourbook::domain::entitlement::{Post, PostStatus, User};
use tourbook::domain::foundation::{PlanId, PostId, UserId};
use tourbook::domain::subscription::{
    AuthorityPayment, AuthorityPreapproval, BillingCycle, Plan, SubscriptionStatus,
    RECURRING_PAYMENT,
};
use tourbook::ports::{AuthorityError, PostRepository, SubscriptionRepository};

// =============================================================================
// Test Infrastructure
// =============================================================================

const USER: &str = "traveler-7";

fn user_id() -> UserId {
    UserId::new(USER).unwrap()
}

fn plan() -> Plan {
    Plan {
        id: PlanId::new("pro").unwrap(),
        name: "Pro".to_string(),
        price: 19_900,
        currency: "ARS".to_string(),
        billing_cycle: BillingCycle::Monthly,
        max_posts: Some(10),
        max_bookings: None,
    }
}

fn payment(id: &str, status: &str) -> AuthorityPayment {
    AuthorityPayment {
        id: id.to_string(),
        status: status.to_string(),
        status_detail: None,
        operation_type: Some(RECURRING_PAYMENT.to_string()),
        external_reference: Some(format!("subscription_pro_{}", USER)),
        transaction_amount: Some(199.0),
        currency_id: Some("ARS".to_string()),
        card: None,
    }
}

fn preapproval(id: &str, status: &str) -> AuthorityPreapproval {
    AuthorityPreapproval {
        id: id.to_string(),
        status: status.to_string(),
        external_reference: Some(format!("subscription_pro_{}", USER)),
        reason: None,
    }
}

struct TestApp {
    router: Router,
    authority: MockPaymentAuthority,
    subscriptions: Arc<InMemorySubscriptionRepository>,
    posts: Arc<InMemoryPostRepository>,
}

impl TestApp {
    fn new() -> Self {
        let authority = MockPaymentAuthority::new();
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let posts = Arc::new(InMemoryPostRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        users.insert(User::new(user_id()));

        let repositories = Repositories {
            bookings: Arc::new(InMemoryBookingRepository::new()),
            subscriptions: subscriptions.clone(),
            payments: Arc::new(InMemoryPaymentRepository::new()),
            plans: Arc::new(InMemoryPlanRepository::with_plans([plan()])),
            users,
            posts: posts.clone(),
        };
        let state = build_state(
            repositories,
            Arc::new(InMemoryCache::new()),
            Arc::new(authority.clone()),
            Arc::new(RecordingNotificationSender::new()),
            SystemToken::default(),
            &CacheConfig::default(),
        );

        Self {
            router: app_router(state, std::time::Duration::from_secs(5)),
            authority,
            subscriptions,
            posts,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn deliver(&self, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/webhooks/subscription")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn entitlements(&self) -> Value {
        let (status, body) = self
            .send(
                Request::builder()
                    .uri("/entitlements")
                    .header("X-User-Id", USER)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    async fn status(&self) -> Option<SubscriptionStatus> {
        self.subscriptions
            .find_current_for_user(&user_id())
            .await
            .unwrap()
            .map(|s| s.status)
    }

    fn seed_post(&self) -> PostId {
        let id = PostId::new();
        self.posts.insert(
            Post {
                id,
                owner_id: user_id(),
                status: PostStatus::Active,
                is_enabled: true,
                deactivation_reason: None,
                deactivated_at: None,
            },
            vec![],
        );
        id
    }
}

fn payment_event(id: &str, action: &str) -> Value {
    json!({"type": "payment", "action": action, "data": {"id": id}})
}

fn has_role(entitlements: &Value, role: &str) -> bool {
    entitlements["roles"]
        .as_array()
        .map(|roles| roles.iter().any(|r| r == role))
        .unwrap_or(false)
}

// =============================================================================
// Deduplication
// =============================================================================

#[tokio::test]
async fn redelivered_webhook_is_processed_once() {
    let app = TestApp::new();
    app.authority.put_payment(payment("pay-1", "approved"));

    let (first_status, first) = app.deliver(payment_event("pay-1", "payment.created")).await;
    let (second_status, second) = app.deliver(payment_event("pay-1", "payment.created")).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(first, json!({"received": true}));
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(second, json!({"received": true, "duplicate": true}));
    assert_eq!(app.authority.calls(), vec!["payment:pay-1".to_string()]);
}

#[tokio::test]
async fn different_action_is_a_new_delivery() {
    let app = TestApp::new();
    app.authority.put_payment(payment("pay-1", "approved"));

    app.deliver(payment_event("pay-1", "payment.created")).await;
    let (_, body) = app.deliver(payment_event("pay-1", "payment.updated")).await;

    assert_eq!(body, json!({"received": true}));
    assert_eq!(app.authority.calls().len(), 2);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app.deliver(json!({"type": "payment"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn authority_outage_is_retried_by_the_sender() {
    let app = TestApp::new();
    app.authority.put_payment(payment("pay-1", "approved"));
    app.authority
        .fail_next(AuthorityError::network("connection reset"));

    let (failed, _) = app.deliver(payment_event("pay-1", "payment.created")).await;
    let (retried, body) = app.deliver(payment_event("pay-1", "payment.created")).await;

    assert_eq!(failed, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(retried, StatusCode::OK);
    assert_eq!(body, json!({"received": true}));
    assert_eq!(app.status().await, Some(SubscriptionStatus::Active));
}

// =============================================================================
// Reconciliation and entitlements
// =============================================================================

#[tokio::test]
async fn approved_payment_grants_publisher() {
    let app = TestApp::new();
    assert!(!has_role(&app.entitlements().await, "publisher"));

    app.authority.put_payment(payment("pay-1", "approved"));
    app.deliver(payment_event("pay-1", "payment.created")).await;

    let ents = app.entitlements().await;
    assert_eq!(app.status().await, Some(SubscriptionStatus::Active));
    assert!(has_role(&ents, "publisher"));
    assert_eq!(ents["isActive"], true);
    assert_eq!(ents["planId"], "pro");
}

#[tokio::test]
async fn late_pending_payment_does_not_regress_active_subscription() {
    let app = TestApp::new();
    app.authority.put_payment(payment("pay-1", "approved"));
    app.deliver(payment_event("pay-1", "payment.created")).await;

    app.authority.put_payment(payment("pay-2", "pending"));
    let (status, body) = app.deliver(payment_event("pay-2", "payment.created")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"received": true}));
    assert_eq!(app.status().await, Some(SubscriptionStatus::Active));
    assert!(has_role(&app.entitlements().await, "publisher"));
}

#[tokio::test]
async fn rejected_payment_revokes_publisher_and_hides_posts() {
    let app = TestApp::new();
    app.authority.put_payment(payment("pay-1", "approved"));
    app.deliver(payment_event("pay-1", "payment.created")).await;
    let post = app.seed_post();

    app.authority.put_payment(payment("pay-2", "rejected"));
    app.deliver(payment_event("pay-2", "payment.created")).await;

    assert_eq!(app.status().await, None);
    assert!(!has_role(&app.entitlements().await, "publisher"));
    let owned = app.posts.find_by_owner(&user_id()).await.unwrap();
    let stored = owned.iter().find(|p| p.id == post).unwrap();
    assert_eq!(stored.status, PostStatus::Inactive);
    assert!(!stored.is_enabled);
}

#[tokio::test]
async fn preapproval_pause_and_resume_follow_the_authority() {
    let app = TestApp::new();
    app.authority.put_payment(payment("pay-1", "approved"));
    app.deliver(payment_event("pay-1", "payment.created")).await;

    app.authority.put_preapproval(preapproval("pre-1", "paused"));
    let (status, _) = app
        .deliver(json!({"type": "subscription_preapproval", "data": {"id": "pre-1"}}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.status().await, Some(SubscriptionStatus::Paused));

    app.authority.put_preapproval(preapproval("pre-1", "authorized"));
    app.deliver(json!({"type": "preapproval", "action": "updated", "data": {"id": "pre-1"}}))
        .await;

    assert_eq!(app.status().await, Some(SubscriptionStatus::Active));
    assert!(has_role(&app.entitlements().await, "publisher"));
    let current = app
        .subscriptions
        .find_current_for_user(&user_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.external_subscription_id.as_deref(), Some("pre-1"));
}

#[tokio::test]
async fn unknown_topic_is_acknowledged() {
    let app = TestApp::new();

    let (status, body) = app
        .deliver(json!({"type": "merchant_order", "data": {"id": "mo-1"}}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
    assert!(app.authority.calls().is_empty());
}
