//! ReconcileEntitlementsHandler - Brings roles and posts in line with the
//! user's current subscription and reports what the user may do.

use std::sync::Arc;

use crate::domain::entitlement::{
    plan_roles, EntitlementError, UserEntitlements, Usage, DEACTIVATION_REASON,
    RECONCILIATION_ACTOR,
};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{
    BookingRepository, PlanRepository, PostRepository, SubscriptionRepository, UserRepository,
};

#[derive(Debug, Clone)]
pub struct ReconcileEntitlementsCommand {
    pub user_id: UserId,
}

/// Grants or revokes roles, deactivating posts ahead of a publisher
/// revocation, then evaluates quotas against current usage.
///
/// Superadmins are evaluated but never mutated.
pub struct ReconcileEntitlementsHandler {
    users: Arc<dyn UserRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanRepository>,
    posts: Arc<dyn PostRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl ReconcileEntitlementsHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        plans: Arc<dyn PlanRepository>,
        posts: Arc<dyn PostRepository>,
        bookings: Arc<dyn BookingRepository>,
    ) -> Self {
        Self {
            users,
            subscriptions,
            plans,
            posts,
            bookings,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReconcileEntitlementsCommand,
    ) -> Result<UserEntitlements, EntitlementError> {
        let user_id = cmd.user_id;

        // 1. Load user and current subscription
        let (user, subscription) = tokio::try_join!(
            self.users.find_by_id(&user_id),
            self.subscriptions.find_current_for_user(&user_id),
        )?;
        let mut user = user.ok_or_else(|| EntitlementError::UserNotFound(user_id.clone()))?;

        let plan = match &subscription {
            Some(sub) => self.plans.find_by_id(&sub.plan_id).await?,
            None => None,
        };

        // 2. Apply role changes. Posts go first: once the publisher role
        // is gone a retry no longer plans the deactivation.
        let role_plan = plan_roles(&user, subscription.as_ref());
        if !role_plan.is_empty() {
            let now = Timestamp::now();
            if role_plan.deactivate_posts {
                let deactivated = self
                    .posts
                    .deactivate_all_for_owner(&user_id, DEACTIVATION_REASON, now)
                    .await?;
                tracing::info!(
                    user_id = %user_id,
                    deactivated,
                    "Deactivated posts before publisher revocation"
                );
            }

            for role in &role_plan.grant {
                user.grant(*role, RECONCILIATION_ACTOR, now);
            }
            for role in &role_plan.revoke {
                user.revoke(*role);
            }
            self.users.save_roles(&user).await?;

            tracing::info!(
                user_id = %user_id,
                granted = ?role_plan.grant,
                revoked = ?role_plan.revoke,
                "Reconciled user roles"
            );
        }

        // 3. Evaluate quotas
        let (active_posts, bookings) = tokio::try_join!(
            self.posts.count_active_by_owner(&user_id),
            self.bookings.count_by_client(&user_id),
        )?;

        Ok(UserEntitlements::evaluate(
            &user,
            subscription.as_ref(),
            plan.as_ref(),
            Usage {
                active_posts,
                bookings,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryBookingRepository, InMemoryPlanRepository, InMemoryPostRepository,
        InMemorySubscriptionRepository, InMemoryUserRepository,
    };
    use crate::domain::booking::CancellationPolicy;
    use crate::domain::entitlement::{Post, PostStatus, Role, User};
    use crate::domain::foundation::{DomainError, PlanId, PostId, SubscriptionId};
    use crate::domain::subscription::{BillingCycle, Plan, Subscription, SubscriptionStatus};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Fails the first `failures` deactivations, then delegates.
    struct FlakyPostRepository {
        inner: Arc<InMemoryPostRepository>,
        failures: Mutex<u32>,
    }

    #[async_trait]
    impl PostRepository for FlakyPostRepository {
        async fn cancellation_policies(
            &self,
            post_id: &PostId,
        ) -> Result<Vec<CancellationPolicy>, DomainError> {
            self.inner.cancellation_policies(post_id).await
        }

        async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<Post>, DomainError> {
            self.inner.find_by_owner(owner_id).await
        }

        async fn count_active_by_owner(&self, owner_id: &UserId) -> Result<u32, DomainError> {
            self.inner.count_active_by_owner(owner_id).await
        }

        async fn deactivate_all_for_owner(
            &self,
            owner_id: &UserId,
            reason: &str,
            now: Timestamp,
        ) -> Result<u32, DomainError> {
            {
                let mut failures = self.failures.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(DomainError::database("statement timeout"));
                }
            }
            self.inner.deactivate_all_for_owner(owner_id, reason, now).await
        }
    }

    struct Fixture {
        users: Arc<InMemoryUserRepository>,
        subscriptions: Arc<InMemorySubscriptionRepository>,
        posts: Arc<InMemoryPostRepository>,
        handler: ReconcileEntitlementsHandler,
    }

    fn plan() -> Plan {
        Plan {
            id: PlanId::new("basic").unwrap(),
            name: "Basic".to_string(),
            price: 9_900,
            currency: "ARS".to_string(),
            billing_cycle: BillingCycle::Monthly,
            max_posts: Some(2),
            max_bookings: None,
        }
    }

    fn user_id() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn fixture(roles: &[Role]) -> Fixture {
        fixture_with_posts(roles, |posts| posts as Arc<dyn PostRepository>)
    }

    fn fixture_with_posts(
        roles: &[Role],
        wrap_posts: impl FnOnce(Arc<InMemoryPostRepository>) -> Arc<dyn PostRepository>,
    ) -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let mut user = User::new(user_id());
        for role in roles {
            user.grant(*role, "seed", Timestamp::now());
        }
        users.insert(user);

        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let posts = Arc::new(InMemoryPostRepository::new());
        let handler = ReconcileEntitlementsHandler::new(
            users.clone(),
            subscriptions.clone(),
            Arc::new(InMemoryPlanRepository::with_plans([plan()])),
            wrap_posts(posts.clone()),
            Arc::new(InMemoryBookingRepository::new()),
        );
        Fixture {
            users,
            subscriptions,
            posts,
            handler,
        }
    }

    async fn subscribe(fx: &Fixture, status: SubscriptionStatus) {
        let sub = Subscription::open(
            SubscriptionId::new(),
            user_id(),
            &plan(),
            status,
            "test",
            Timestamp::now(),
        );
        fx.subscriptions.save(&sub).await.unwrap();
    }

    fn active_post() -> Post {
        Post {
            id: PostId::new(),
            owner_id: user_id(),
            status: PostStatus::Active,
            is_enabled: true,
            deactivation_reason: None,
            deactivated_at: None,
        }
    }

    async fn reconcile(fx: &Fixture) -> UserEntitlements {
        fx.handler
            .handle(ReconcileEntitlementsCommand { user_id: user_id() })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn active_subscriber_becomes_publisher() {
        let fx = fixture(&[]);
        subscribe(&fx, SubscriptionStatus::Active).await;
        fx.posts.insert(active_post(), vec![]);

        let ents = reconcile(&fx).await;

        assert_eq!(ents.roles, vec![Role::Client, Role::Publisher]);
        assert!(ents.is_active);
        assert_eq!(ents.remaining_posts, Some(1));
        assert!(ents.can_create_posts);
        assert_eq!(ents.remaining_bookings, None);
        let stored = fx.users.find_by_id(&user_id()).await.unwrap().unwrap();
        assert!(stored.has_role(Role::Publisher));
    }

    #[tokio::test]
    async fn revocation_deactivates_every_post() {
        let fx = fixture(&[Role::Client, Role::Publisher]);
        fx.posts.insert(active_post(), vec![]);
        fx.posts.insert(active_post(), vec![]);

        let ents = reconcile(&fx).await;

        assert_eq!(ents.roles, vec![Role::Client]);
        assert!(!ents.has_subscription);
        assert_eq!(fx.posts.count_active_by_owner(&user_id()).await.unwrap(), 0);
        let posts = fx.posts.find_by_owner(&user_id()).await.unwrap();
        assert!(posts
            .iter()
            .all(|p| p.deactivation_reason.as_deref() == Some(DEACTIVATION_REASON)));
    }

    #[tokio::test]
    async fn failed_deactivation_keeps_publisher_until_retry() {
        let fx = fixture_with_posts(&[Role::Client, Role::Publisher], |posts| {
            Arc::new(FlakyPostRepository {
                inner: posts,
                failures: Mutex::new(1),
            }) as Arc<dyn PostRepository>
        });
        fx.posts.insert(active_post(), vec![]);

        let err = fx
            .handler
            .handle(ReconcileEntitlementsCommand { user_id: user_id() })
            .await
            .unwrap_err();

        assert!(matches!(err, EntitlementError::Infrastructure(_)));
        let stored = fx.users.find_by_id(&user_id()).await.unwrap().unwrap();
        assert!(stored.has_role(Role::Publisher));
        assert_eq!(fx.posts.count_active_by_owner(&user_id()).await.unwrap(), 1);

        let ents = reconcile(&fx).await;

        assert_eq!(ents.roles, vec![Role::Client]);
        assert_eq!(fx.posts.count_active_by_owner(&user_id()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn on_hold_counts_as_subscribed_but_not_active() {
        let fx = fixture(&[Role::Client]);
        subscribe(&fx, SubscriptionStatus::OnHold).await;

        let ents = reconcile(&fx).await;

        assert!(ents.has_subscription);
        assert!(!ents.is_active);
        assert!(!ents.can_create_posts);
        assert_eq!(ents.roles, vec![Role::Client]);
    }

    #[tokio::test]
    async fn superadmin_is_never_mutated() {
        let fx = fixture(&[Role::Superadmin]);
        fx.posts.insert(active_post(), vec![]);

        let ents = reconcile(&fx).await;

        assert_eq!(ents.roles, vec![Role::Superadmin]);
        assert_eq!(fx.posts.count_active_by_owner(&user_id()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_user_is_reported() {
        let fx = fixture(&[]);
        let err = fx
            .handler
            .handle(ReconcileEntitlementsCommand {
                user_id: UserId::new("ghost").unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, EntitlementError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn reconcile_is_idempotent() {
        let fx = fixture(&[]);
        subscribe(&fx, SubscriptionStatus::Active).await;

        let first = reconcile(&fx).await;
        let second = reconcile(&fx).await;

        assert_eq!(first, second);
        let stored = fx.users.find_by_id(&user_id()).await.unwrap().unwrap();
        assert_eq!(stored.roles.len(), 2);
    }
}
