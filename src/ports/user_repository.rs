//! User repository port.

use async_trait::async_trait;

use crate::domain::entitlement::User;
use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Replaces the user's role assignments.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user doesn't exist
    async fn save_roles(&self, user: &User) -> Result<(), DomainError>;
}
