//! PostgreSQL implementation of SubscriptionRepository.
//!
//! The one-current-subscription-per-user rule is enforced by the partial
//! unique index `subscriptions_one_current_per_user`. Updates are
//! compare-and-swap on the `version` column.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, PlanId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::subscription::{
    BillingCycle, Subscription, SubscriptionMetadata, SubscriptionStatus,
};
use crate::ports::SubscriptionRepository;

use super::{db_error, parse_user_id};

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: String,
    plan_id: String,
    plan_name: String,
    external_subscription_id: Option<String>,
    amount: i64,
    currency: String,
    status: String,
    external_status: String,
    billing_cycle: String,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    metadata: Json<SubscriptionMetadata>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let status = SubscriptionStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid subscription status: {}", row.status),
            )
        })?;
        let billing_cycle = BillingCycle::parse(&row.billing_cycle).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid billing cycle: {}", row.billing_cycle),
            )
        })?;
        let plan_id = PlanId::new(row.plan_id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid plan_id: {}", e))
        })?;

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: parse_user_id(row.user_id)?,
            plan_id,
            plan_name: row.plan_name,
            external_subscription_id: row.external_subscription_id,
            amount: row.amount,
            currency: row.currency,
            status,
            external_status: row.external_status,
            billing_cycle,
            start_date: Timestamp::from_datetime(row.start_date),
            end_date: row.end_date.map(Timestamp::from_datetime),
            metadata: row.metadata.0,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            version: u64::try_from(row.version).unwrap_or(0),
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, plan_id, plan_name, external_subscription_id, amount, currency,
           status, external_status, billing_cycle, start_date, end_date, metadata,
           created_at, updated_at, version
    FROM subscriptions
"#;

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, plan_id, plan_name, external_subscription_id, amount, currency,
                status, external_status, billing_cycle, start_date, end_date, metadata,
                created_at, updated_at, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.user_id.as_str())
        .bind(subscription.plan_id.as_str())
        .bind(&subscription.plan_name)
        .bind(&subscription.external_subscription_id)
        .bind(subscription.amount)
        .bind(&subscription.currency)
        .bind(subscription.status.as_str())
        .bind(&subscription.external_status)
        .bind(subscription.billing_cycle.as_str())
        .bind(subscription.start_date.as_datetime())
        .bind(subscription.end_date.map(|t| *t.as_datetime()))
        .bind(Json(&subscription.metadata))
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .bind(subscription.version as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("subscriptions_one_current_per_user") {
                    return DomainError::validation(
                        "user_id",
                        "User already has a current subscription",
                    );
                }
            }
            DomainError::database(format!("Failed to save subscription: {}", e))
        })?;

        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                external_subscription_id = $3,
                status = $4,
                external_status = $5,
                end_date = $6,
                metadata = $7,
                updated_at = $8,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.version as i64)
        .bind(&subscription.external_subscription_id)
        .bind(subscription.status.as_str())
        .bind(&subscription.external_status)
        .bind(subscription.end_date.map(|t| *t.as_datetime()))
        .bind(Json(&subscription.metadata))
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("update subscription"))?;

        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> =
                sqlx::query_as("SELECT version FROM subscriptions WHERE id = $1")
                    .bind(subscription.id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(db_error("check subscription version"))?;
            return Err(match exists {
                None => DomainError::new(ErrorCode::SubscriptionNotFound, "Subscription not found"),
                Some(_) => DomainError::new(
                    ErrorCode::ConcurrentModification,
                    "Subscription was modified concurrently",
                ),
            });
        }

        Ok(subscription.version + 1)
    }

    async fn find_current_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        let query = format!(
            "{} WHERE user_id = $1 AND status IN ('pending', 'active', 'on_hold', 'paused') \
             ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let row: Option<SubscriptionRow> = sqlx::query_as(&query)
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find current subscription"))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_external_id(
        &self,
        external_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let query = format!(
            "{} WHERE external_subscription_id = $1 ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let row: Option<SubscriptionRow> = sqlx::query_as(&query)
            .bind(external_subscription_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find subscription by external id"))?;

        row.map(Subscription::try_from).transpose()
    }
}
