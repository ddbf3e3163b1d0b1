//! PostgreSQL implementation of PostRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::booking::CancellationPolicy;
use crate::domain::entitlement::{Post, PostStatus};
use crate::domain::foundation::{DomainError, ErrorCode, PostId, Timestamp, UserId};
use crate::ports::PostRepository;

use super::{db_error, parse_user_id};

pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    owner_id: String,
    status: String,
    is_enabled: bool,
    deactivation_reason: Option<String>,
    deactivated_at: Option<DateTime<Utc>>,
}

impl TryFrom<PostRow> for Post {
    type Error = DomainError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let status = PostStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid post status: {}", row.status),
            )
        })?;
        Ok(Post {
            id: PostId::from_uuid(row.id),
            owner_id: parse_user_id(row.owner_id)?,
            status,
            is_enabled: row.is_enabled,
            deactivation_reason: row.deactivation_reason,
            deactivated_at: row.deactivated_at.map(Timestamp::from_datetime),
        })
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn cancellation_policies(
        &self,
        post_id: &PostId,
    ) -> Result<Vec<CancellationPolicy>, DomainError> {
        let row: Option<(Json<Vec<CancellationPolicy>>,)> =
            sqlx::query_as("SELECT cancellation_policies FROM posts WHERE id = $1")
                .bind(post_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("load cancellation policies"))?;

        Ok(row.map(|(policies,)| policies.0).unwrap_or_default())
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<Post>, DomainError> {
        let rows: Vec<PostRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, status, is_enabled, deactivation_reason, deactivated_at
            FROM posts
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("find posts by owner"))?;

        rows.into_iter().map(Post::try_from).collect()
    }

    async fn count_active_by_owner(&self, owner_id: &UserId) -> Result<u32, DomainError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM posts WHERE owner_id = $1 AND status = 'active'",
        )
        .bind(owner_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("count active posts"))?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn deactivate_all_for_owner(
        &self,
        owner_id: &UserId,
        reason: &str,
        now: Timestamp,
    ) -> Result<u32, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET
                status = 'inactive',
                is_enabled = FALSE,
                deactivation_reason = $2,
                deactivated_at = $3
            WHERE owner_id = $1 AND status = 'active'
            "#,
        )
        .bind(owner_id.as_str())
        .bind(reason)
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("deactivate posts"))?;

        Ok(u32::try_from(result.rows_affected()).unwrap_or(u32::MAX))
    }
}
