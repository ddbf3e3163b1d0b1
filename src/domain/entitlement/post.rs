//! Posts (listings) as seen by the entitlement synchronizer.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PostId, Timestamp, UserId};

/// Publication status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Active,
    Inactive,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Active => "active",
            PostStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(PostStatus::Active),
            "inactive" => Some(PostStatus::Inactive),
            _ => None,
        }
    }
}

/// Listing owned by a publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub owner_id: UserId,
    pub status: PostStatus,
    pub is_enabled: bool,
    pub deactivation_reason: Option<String>,
    pub deactivated_at: Option<Timestamp>,
}

impl Post {
    pub fn is_active(&self) -> bool {
        self.status == PostStatus::Active
    }

    /// Takes the post off the marketplace with an audit reason.
    pub fn deactivate(&mut self, reason: &str, now: Timestamp) {
        self.status = PostStatus::Inactive;
        self.is_enabled = false;
        self.deactivation_reason = Some(reason.to_string());
        self.deactivated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deactivate_records_reason() {
        let mut post = Post {
            id: PostId::new(),
            owner_id: UserId::new("u1").unwrap(),
            status: PostStatus::Active,
            is_enabled: true,
            deactivation_reason: None,
            deactivated_at: None,
        };
        post.deactivate("subscription ended", Timestamp::from_unix_millis(1));
        assert!(!post.is_active());
        assert!(!post.is_enabled);
        assert_eq!(post.deactivation_reason.as_deref(), Some("subscription ended"));
    }
}
