//! Harness shared by the subscription handler tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::adapters::cache::InMemoryCache;
use crate::adapters::memory::{
    InMemoryBookingRepository, InMemoryPaymentRepository, InMemoryPlanRepository,
    InMemoryPostRepository, InMemorySubscriptionRepository, InMemoryUserRepository,
};
use crate::adapters::payment_authority::MockPaymentAuthority;
use crate::application::handlers::entitlement::{
    EntitlementCache, EntitlementCacheConfig, ReconcileEntitlementsHandler,
};
use crate::domain::entitlement::{Post, PostStatus, User};
use crate::domain::foundation::{DomainError, PlanId, PostId, UserId};
use crate::domain::subscription::{
    AuthorityPayment, AuthorityPreapproval, BillingCycle, Plan, Subscription,
    SubscriptionError, RECURRING_PAYMENT,
};
use crate::ports::{PostRepository, SubscriptionRepository, UserRepository};

use super::{
    IngestWebhookHandler, PaymentReconciliation, PreapprovalReconciliation,
    ReconcilePaymentCommand, ReconcilePaymentHandler, ReconcilePreapprovalCommand,
    ReconcilePreapprovalHandler,
};

pub fn user_id() -> UserId {
    UserId::new("user-1").unwrap()
}

pub fn plan() -> Plan {
    Plan {
        id: PlanId::new("basic").unwrap(),
        name: "Basic".to_string(),
        price: 9_900,
        currency: "ARS".to_string(),
        billing_cycle: BillingCycle::Monthly,
        max_posts: Some(5),
        max_bookings: None,
    }
}

pub fn payment(id: &str, status: &str) -> AuthorityPayment {
    AuthorityPayment {
        id: id.to_string(),
        status: status.to_string(),
        status_detail: None,
        operation_type: Some(RECURRING_PAYMENT.to_string()),
        external_reference: Some("subscription_basic_user-1".to_string()),
        transaction_amount: Some(99.0),
        currency_id: Some("ARS".to_string()),
        card: None,
    }
}

pub fn preapproval(id: &str, status: &str) -> AuthorityPreapproval {
    AuthorityPreapproval {
        id: id.to_string(),
        status: status.to_string(),
        external_reference: Some("subscription_basic_user-1".to_string()),
        reason: None,
    }
}

pub struct Harness {
    pub authority: MockPaymentAuthority,
    pub subscriptions: Arc<InMemorySubscriptionRepository>,
    pub payments: Arc<InMemoryPaymentRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub posts: Arc<InMemoryPostRepository>,
    pub entitlements: Arc<EntitlementCache>,
    pub dedup: InMemoryCache,
    pub payment_handler: Arc<ReconcilePaymentHandler>,
    pub preapproval_handler: Arc<ReconcilePreapprovalHandler>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_stores(
            |subscriptions| subscriptions as Arc<dyn SubscriptionRepository>,
            |posts| posts as Arc<dyn PostRepository>,
        )
    }

    /// Harness whose handlers see a [`ScriptedSubscriptionRepository`].
    pub fn scripted() -> (Self, Arc<ScriptedSubscriptionRepository>) {
        let mut scripted = None;
        let h = Self::with_stores(
            |subscriptions| {
                let store = Arc::new(ScriptedSubscriptionRepository::new(subscriptions));
                scripted = Some(store.clone());
                store as Arc<dyn SubscriptionRepository>
            },
            |posts| posts as Arc<dyn PostRepository>,
        );
        (h, scripted.unwrap())
    }

    /// Builds the harness with the handlers talking to wrapped stores.
    /// Assertions still read the in-memory stores underneath.
    pub fn with_stores(
        wrap_subscriptions: impl FnOnce(
            Arc<InMemorySubscriptionRepository>,
        ) -> Arc<dyn SubscriptionRepository>,
        wrap_posts: impl FnOnce(Arc<InMemoryPostRepository>) -> Arc<dyn PostRepository>,
    ) -> Self {
        let authority = MockPaymentAuthority::new();
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        users.insert(User::new(user_id()));
        let posts = Arc::new(InMemoryPostRepository::new());
        let plans = Arc::new(InMemoryPlanRepository::with_plans([plan()]));
        let subscription_store = wrap_subscriptions(subscriptions.clone());

        let reconciler = ReconcileEntitlementsHandler::new(
            users.clone(),
            subscription_store.clone(),
            plans.clone(),
            wrap_posts(posts.clone()),
            Arc::new(InMemoryBookingRepository::new()),
        );
        let entitlements = Arc::new(EntitlementCache::new(
            Arc::new(InMemoryCache::new()),
            Arc::new(reconciler),
            EntitlementCacheConfig::default(),
        ));

        let payment_handler = Arc::new(ReconcilePaymentHandler::new(
            Arc::new(authority.clone()),
            subscription_store.clone(),
            payments.clone(),
            plans,
            entitlements.clone(),
        ));
        let preapproval_handler = Arc::new(ReconcilePreapprovalHandler::new(
            Arc::new(authority.clone()),
            subscription_store,
            entitlements.clone(),
        ));

        Self {
            authority,
            subscriptions,
            payments,
            users,
            posts,
            entitlements,
            dedup: InMemoryCache::new(),
            payment_handler,
            preapproval_handler,
        }
    }

    pub fn ingest(&self) -> IngestWebhookHandler {
        IngestWebhookHandler::new(
            Arc::new(self.dedup.clone()),
            self.payment_handler.clone(),
            self.preapproval_handler.clone(),
        )
    }

    pub async fn reconcile_payment(
        &self,
        payment_id: &str,
    ) -> Result<PaymentReconciliation, SubscriptionError> {
        self.payment_handler
            .handle(ReconcilePaymentCommand {
                payment_id: payment_id.to_string(),
            })
            .await
    }

    pub async fn reconcile_preapproval(
        &self,
        preapproval_id: &str,
    ) -> Result<PreapprovalReconciliation, SubscriptionError> {
        self.preapproval_handler
            .handle(ReconcilePreapprovalCommand {
                preapproval_id: preapproval_id.to_string(),
            })
            .await
    }

    pub async fn current(&self) -> Option<Subscription> {
        self.subscriptions
            .find_current_for_user(&user_id())
            .await
            .unwrap()
    }

    pub async fn user(&self) -> User {
        self.users.find_by_id(&user_id()).await.unwrap().unwrap()
    }

    pub fn seed_active_post(&self) {
        self.posts.insert(
            Post {
                id: PostId::new(),
                owner_id: user_id(),
                status: PostStatus::Active,
                is_enabled: true,
                deactivation_reason: None,
                deactivated_at: None,
            },
            vec![],
        );
    }

    pub async fn active_posts(&self) -> u32 {
        self.posts.count_active_by_owner(&user_id()).await.unwrap()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scripted subscription store
// ════════════════════════════════════════════════════════════════════════════

/// Delegates to an in-memory store, with scripted interference: failing
/// saves, and a competing write committed right after the next
/// current-subscription read.
pub struct ScriptedSubscriptionRepository {
    inner: Arc<InMemorySubscriptionRepository>,
    failing_saves: Mutex<u32>,
    competing_write: Mutex<Option<Subscription>>,
}

impl ScriptedSubscriptionRepository {
    pub fn new(inner: Arc<InMemorySubscriptionRepository>) -> Self {
        Self {
            inner,
            failing_saves: Mutex::new(0),
            competing_write: Mutex::new(None),
        }
    }

    pub fn fail_saves(&self, count: u32) {
        *self.failing_saves.lock().unwrap() = count;
    }

    pub fn commit_after_next_read(&self, subscription: Subscription) {
        *self.competing_write.lock().unwrap() = Some(subscription);
    }
}

#[async_trait]
impl SubscriptionRepository for ScriptedSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        {
            let mut failing = self.failing_saves.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(DomainError::database("connection reset by peer"));
            }
        }
        self.inner.save(subscription).await
    }

    async fn update(&self, subscription: &Subscription) -> Result<u64, DomainError> {
        self.inner.update(subscription).await
    }

    async fn find_current_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        let current = self.inner.find_current_for_user(user_id).await?;
        let competing = self.competing_write.lock().unwrap().take();
        if let Some(competing) = competing {
            self.inner.update(&competing).await?;
        }
        Ok(current)
    }

    async fn find_by_external_id(
        &self,
        external_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        self.inner.find_by_external_id(external_subscription_id).await
    }
}
