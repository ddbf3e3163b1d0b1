//! In-memory user and post repositories.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::booking::CancellationPolicy;
use crate::domain::entitlement::{Post, User};
use crate::domain::foundation::{DomainError, ErrorCode, PostId, Timestamp, UserId};
use crate::ports::{PostRepository, UserRepository};

use super::lock;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        lock(&self.users).insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(lock(&self.users).get(id).cloned())
    }

    async fn save_roles(&self, user: &User) -> Result<(), DomainError> {
        let mut users = lock(&self.users);
        let stored = users.get_mut(&user.id).ok_or_else(|| {
            DomainError::new(ErrorCode::UserNotFound, format!("User not found: {}", user.id))
        })?;
        stored.roles = user.roles.clone();
        Ok(())
    }
}

struct StoredPost {
    post: Post,
    policies: Vec<CancellationPolicy>,
}

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: Mutex<HashMap<PostId, StoredPost>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, post: Post, policies: Vec<CancellationPolicy>) {
        lock(&self.posts).insert(post.id, StoredPost { post, policies });
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn cancellation_policies(
        &self,
        post_id: &PostId,
    ) -> Result<Vec<CancellationPolicy>, DomainError> {
        Ok(lock(&self.posts)
            .get(post_id)
            .map(|stored| stored.policies.clone())
            .unwrap_or_default())
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<Post>, DomainError> {
        Ok(lock(&self.posts)
            .values()
            .filter(|stored| &stored.post.owner_id == owner_id)
            .map(|stored| stored.post.clone())
            .collect())
    }

    async fn count_active_by_owner(&self, owner_id: &UserId) -> Result<u32, DomainError> {
        let count = lock(&self.posts)
            .values()
            .filter(|stored| &stored.post.owner_id == owner_id && stored.post.is_active())
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn deactivate_all_for_owner(
        &self,
        owner_id: &UserId,
        reason: &str,
        now: Timestamp,
    ) -> Result<u32, DomainError> {
        let mut deactivated = 0;
        for stored in lock(&self.posts).values_mut() {
            if &stored.post.owner_id == owner_id && stored.post.is_active() {
                stored.post.deactivate(reason, now);
                deactivated += 1;
            }
        }
        Ok(deactivated)
    }
}
