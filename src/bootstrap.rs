//! Composition root.
//!
//! Builds the handler graph from a set of repositories, the shared cache
//! and the payment authority client. The binary and the integration tests
//! both assemble the service through here.

use std::sync::Arc;

use sqlx::PgPool;

use crate::adapters::http::{
    AppState, BookingAppState, EntitlementAppState, SystemToken, WebhookAppState,
};
use crate::adapters::memory::{
    InMemoryBookingRepository, InMemoryPaymentRepository, InMemoryPlanRepository,
    InMemoryPostRepository, InMemorySubscriptionRepository, InMemoryUserRepository,
};
use crate::adapters::postgres::{
    PostgresBookingRepository, PostgresPaymentRepository, PostgresPlanRepository,
    PostgresPostRepository, PostgresSubscriptionRepository, PostgresUserRepository,
};
use crate::application::handlers::entitlement::{
    EntitlementCache, EntitlementCacheConfig, ReconcileEntitlementsHandler,
};
use crate::application::handlers::subscription::{
    IngestWebhookHandler, ReconcilePaymentHandler, ReconcilePreapprovalHandler,
};
use crate::config::CacheConfig;
use crate::ports::{
    BookingRepository, KeyValueCache, NotificationSender, PaymentAuthority, PaymentRepository,
    PlanRepository, PostRepository, SubscriptionRepository, UserRepository,
};

/// One repository per persisted collection.
#[derive(Clone)]
pub struct Repositories {
    pub bookings: Arc<dyn BookingRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub plans: Arc<dyn PlanRepository>,
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            bookings: Arc::new(PostgresBookingRepository::new(pool.clone())),
            subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
            payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
            plans: Arc::new(PostgresPlanRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool)),
        }
    }

    /// Empty in-memory collections for local runs.
    pub fn in_memory() -> Self {
        Self {
            bookings: Arc::new(InMemoryBookingRepository::new()),
            subscriptions: Arc::new(InMemorySubscriptionRepository::new()),
            payments: Arc::new(InMemoryPaymentRepository::new()),
            plans: Arc::new(InMemoryPlanRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
        }
    }
}

/// Converts configured timings into the entitlement cache's knobs.
pub fn entitlement_cache_config(cache: &CacheConfig) -> EntitlementCacheConfig {
    EntitlementCacheConfig {
        freshness: cache.entitlement_freshness(),
        entry_ttl: cache.entitlement_ttl(),
        lock_ttl: cache.refresh_lock_ttl(),
        poll_interval: cache.poll_interval(),
        wait_ceiling: cache.wait_ceiling(),
    }
}

/// Wires every handler and returns the router state.
pub fn build_state(
    repositories: Repositories,
    cache: Arc<dyn KeyValueCache>,
    authority: Arc<dyn PaymentAuthority>,
    notifier: Arc<dyn NotificationSender>,
    system_token: SystemToken,
    cache_config: &CacheConfig,
) -> AppState {
    let reconciler = Arc::new(ReconcileEntitlementsHandler::new(
        repositories.users.clone(),
        repositories.subscriptions.clone(),
        repositories.plans.clone(),
        repositories.posts.clone(),
        repositories.bookings.clone(),
    ));
    let entitlements = Arc::new(EntitlementCache::new(
        cache.clone(),
        reconciler,
        entitlement_cache_config(cache_config),
    ));

    let payments = Arc::new(ReconcilePaymentHandler::new(
        authority.clone(),
        repositories.subscriptions.clone(),
        repositories.payments.clone(),
        repositories.plans.clone(),
        entitlements.clone(),
    ));
    let preapprovals = Arc::new(ReconcilePreapprovalHandler::new(
        authority,
        repositories.subscriptions.clone(),
        entitlements.clone(),
    ));
    let ingest = IngestWebhookHandler::new(cache, payments, preapprovals)
        .with_dedup_ttl(cache_config.webhook_dedup_ttl());

    AppState {
        bookings: BookingAppState {
            booking_repository: repositories.bookings,
            post_repository: repositories.posts,
            notification_sender: notifier,
            system_token,
        },
        webhooks: WebhookAppState {
            ingest: Arc::new(ingest),
        },
        entitlements: EntitlementAppState { entitlements },
    }
}
