//! Subscription repository port.
//!
//! At most one current (pending, active, on hold, paused) subscription per
//! user. Implementations enforce this in their queries.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::Subscription;

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Save a new subscription.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the user already has a current subscription
    /// - `DatabaseError` on persistence failure
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Update an existing subscription if its stored version still equals
    /// `subscription.version`. Returns the new version.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if it doesn't exist
    /// - `ConcurrentModification` if another writer got there first
    async fn update(&self, subscription: &Subscription) -> Result<u64, DomainError>;

    /// The user's current subscription, most recent first.
    async fn find_current_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Find by the authority's subscription (preapproval) id.
    async fn find_by_external_id(
        &self,
        external_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError>;
}
