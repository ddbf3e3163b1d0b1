//! Post repository port.
//!
//! Posts are owned by the listing service; this crate only reads their
//! cancellation policies and deactivates them on revocation.

use async_trait::async_trait;

use crate::domain::booking::CancellationPolicy;
use crate::domain::entitlement::Post;
use crate::domain::foundation::{DomainError, PostId, Timestamp, UserId};

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Cancellation tiers of a post. Empty if none are defined.
    async fn cancellation_policies(
        &self,
        post_id: &PostId,
    ) -> Result<Vec<CancellationPolicy>, DomainError>;

    /// All posts of an owner.
    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<Post>, DomainError>;

    /// Number of active posts of an owner.
    async fn count_active_by_owner(&self, owner_id: &UserId) -> Result<u32, DomainError>;

    /// Deactivates every active post of an owner. Returns how many changed.
    async fn deactivate_all_for_owner(
        &self,
        owner_id: &UserId,
        reason: &str,
        now: Timestamp,
    ) -> Result<u32, DomainError>;
}
