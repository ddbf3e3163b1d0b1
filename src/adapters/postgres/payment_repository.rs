//! PostgreSQL implementation of PaymentRepository.
//!
//! Recording runs in one transaction: insert-or-nothing on the unique
//! external id, then a locked read and forward-only update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentRecordId, SubscriptionId, Timestamp,
};
use crate::domain::subscription::{PaymentRecord, PaymentStatus, RecordOutcome};
use crate::ports::PaymentRepository;

use super::{db_error, parse_user_id};

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: String,
    subscription_id: Option<Uuid>,
    external_payment_id: String,
    amount: i64,
    currency: String,
    status: String,
    external_status_detail: String,
    external_reference: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status = PaymentStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid payment status: {}", row.status),
            )
        })?;

        Ok(PaymentRecord {
            id: PaymentRecordId::from_uuid(row.id),
            user_id: parse_user_id(row.user_id)?,
            subscription_id: row.subscription_id.map(SubscriptionId::from_uuid),
            external_payment_id: row.external_payment_id,
            amount: row.amount,
            currency: row.currency,
            status,
            external_status_detail: row.external_status_detail,
            external_reference: row.external_reference,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn record(&self, observed: &PaymentRecord) -> Result<RecordOutcome, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, subscription_id, external_payment_id, amount, currency, status,
                external_status_detail, external_reference, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (external_payment_id) DO NOTHING
            "#,
        )
        .bind(observed.id.as_uuid())
        .bind(observed.user_id.as_str())
        .bind(observed.subscription_id.map(|id| *id.as_uuid()))
        .bind(&observed.external_payment_id)
        .bind(observed.amount)
        .bind(&observed.currency)
        .bind(observed.status.as_str())
        .bind(&observed.external_status_detail)
        .bind(&observed.external_reference)
        .bind(observed.created_at.as_datetime())
        .bind(observed.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("insert payment"))?
        .rows_affected();

        if inserted == 1 {
            tx.commit().await.map_err(db_error("commit payment"))?;
            return Ok(RecordOutcome::Inserted);
        }

        let row: PaymentRow = sqlx::query_as(
            r#"
            SELECT id, user_id, subscription_id, external_payment_id, amount, currency, status,
                   external_status_detail, external_reference, created_at, updated_at
            FROM payments
            WHERE external_payment_id = $1
            FOR UPDATE
            "#,
        )
        .bind(&observed.external_payment_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("lock payment"))?;

        let mut stored = PaymentRecord::try_from(row)?;
        let outcome = stored.absorb(observed, observed.updated_at);
        if outcome == RecordOutcome::Advanced {
            sqlx::query(
                r#"
                UPDATE payments SET
                    status = $2,
                    external_status_detail = $3,
                    subscription_id = $4,
                    updated_at = $5
                WHERE id = $1
                "#,
            )
            .bind(stored.id.as_uuid())
            .bind(stored.status.as_str())
            .bind(&stored.external_status_detail)
            .bind(stored.subscription_id.map(|id| *id.as_uuid()))
            .bind(stored.updated_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(db_error("advance payment"))?;
        }

        tx.commit().await.map_err(db_error("commit payment"))?;
        Ok(outcome)
    }

    async fn find_by_external_id(
        &self,
        external_payment_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, subscription_id, external_payment_id, amount, currency, status,
                   external_status_detail, external_reference, created_at, updated_at
            FROM payments
            WHERE external_payment_id = $1
            "#,
        )
        .bind(external_payment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find payment"))?;

        row.map(PaymentRecord::try_from).transpose()
    }
}
