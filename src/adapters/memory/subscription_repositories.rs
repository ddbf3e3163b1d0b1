//! In-memory subscription, payment and plan repositories.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode, PlanId, SubscriptionId, UserId};
use crate::domain::subscription::{PaymentRecord, Plan, RecordOutcome, Subscription};
use crate::ports::{PaymentRepository, PlanRepository, SubscriptionRepository};

use super::lock;

// ════════════════════════════════════════════════════════════════════════════
// Subscriptions
// ════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: Mutex<HashMap<SubscriptionId, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subscription ever stored for `user_id`, oldest first.
    pub fn history_for(&self, user_id: &UserId) -> Vec<Subscription> {
        let mut history: Vec<_> = lock(&self.subscriptions)
            .values()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect();
        history.sort_by_key(|s| s.created_at);
        history
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut subscriptions = lock(&self.subscriptions);
        let has_current = subscription.status.is_current()
            && subscriptions
                .values()
                .any(|s| s.user_id == subscription.user_id && s.status.is_current());
        if has_current {
            return Err(DomainError::validation(
                "user_id",
                "User already has a current subscription",
            ));
        }
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<u64, DomainError> {
        let mut subscriptions = lock(&self.subscriptions);
        let stored = subscriptions.get_mut(&subscription.id).ok_or_else(|| {
            DomainError::new(ErrorCode::SubscriptionNotFound, "Subscription not found")
        })?;

        if stored.version != subscription.version {
            return Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                "Subscription was modified by another request",
            )
            .with_detail("subscription_id", subscription.id.to_string()));
        }

        let next_version = subscription.version + 1;
        *stored = Subscription {
            version: next_version,
            ..subscription.clone()
        };
        Ok(next_version)
    }

    async fn find_current_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(lock(&self.subscriptions)
            .values()
            .filter(|s| &s.user_id == user_id && s.status.is_current())
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn find_by_external_id(
        &self,
        external_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(lock(&self.subscriptions)
            .values()
            .filter(|s| s.external_subscription_id.as_deref() == Some(external_subscription_id))
            .max_by_key(|s| s.created_at)
            .cloned())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Payments
// ════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct InMemoryPaymentRepository {
    payments: Mutex<HashMap<String, PaymentRecord>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.payments).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.payments).is_empty()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn record(&self, observed: &PaymentRecord) -> Result<RecordOutcome, DomainError> {
        let mut payments = lock(&self.payments);
        match payments.get_mut(&observed.external_payment_id) {
            Some(stored) => Ok(stored.absorb(observed, observed.updated_at)),
            None => {
                payments.insert(observed.external_payment_id.clone(), observed.clone());
                Ok(RecordOutcome::Inserted)
            }
        }
    }

    async fn find_by_external_id(
        &self,
        external_payment_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(lock(&self.payments).get(external_payment_id).cloned())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Plans
// ════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct InMemoryPlanRepository {
    plans: Mutex<HashMap<PlanId, Plan>>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: impl IntoIterator<Item = Plan>) -> Self {
        let repo = Self::new();
        for plan in plans {
            repo.insert(plan);
        }
        repo
    }

    pub fn insert(&self, plan: Plan) {
        lock(&self.plans).insert(plan.id.clone(), plan);
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        Ok(lock(&self.plans).get(id).cloned())
    }
}
