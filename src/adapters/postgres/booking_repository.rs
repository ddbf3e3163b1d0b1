//! PostgreSQL implementation of BookingRepository.
//!
//! Updates are compare-and-swap on the `version` column.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingStatus, CancellingParty};
use crate::domain::foundation::{
    BookingId, DomainError, ErrorCode, PostId, Timestamp, UserId,
};
use crate::ports::BookingRepository;

use super::{db_error, parse_user_id};

/// PostgreSQL implementation of the BookingRepository port.
pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a booking.
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    client_id: String,
    owner_id: String,
    post_id: Uuid,
    status: String,
    total_amount: i64,
    currency: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    guest_count: i32,
    rejection_reason: Option<String>,
    cancellation_reason: Option<String>,
    cancelled_by: Option<String>,
    penalty_amount: Option<i64>,
    accepted_at: Option<DateTime<Utc>>,
    declined_at: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

impl TryFrom<BookingRow> for Booking {
    type Error = DomainError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = BookingStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid booking status: {}", row.status),
            )
        })?;
        let cancelled_by = row
            .cancelled_by
            .as_deref()
            .map(|party| {
                CancellingParty::parse(party).ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Invalid cancelled_by value: {}", party),
                    )
                })
            })
            .transpose()?;

        Ok(Booking {
            id: BookingId::from_uuid(row.id),
            client_id: parse_user_id(row.client_id)?,
            owner_id: parse_user_id(row.owner_id)?,
            post_id: PostId::from_uuid(row.post_id),
            status,
            total_amount: row.total_amount,
            currency: row.currency,
            start_date: Timestamp::from_datetime(row.start_date),
            end_date: Timestamp::from_datetime(row.end_date),
            guest_count: u32::try_from(row.guest_count).unwrap_or(0),
            rejection_reason: row.rejection_reason,
            cancellation_reason: row.cancellation_reason,
            cancelled_by,
            penalty_amount: row.penalty_amount,
            accepted_at: row.accepted_at.map(Timestamp::from_datetime),
            declined_at: row.declined_at.map(Timestamp::from_datetime),
            paid_at: row.paid_at.map(Timestamp::from_datetime),
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
            completed_at: row.completed_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            version: u64::try_from(row.version).unwrap_or(0),
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, client_id, owner_id, post_id, status, total_amount, currency,
           start_date, end_date, guest_count, rejection_reason, cancellation_reason,
           cancelled_by, penalty_amount, accepted_at, declined_at, paid_at,
           cancelled_at, completed_at, created_at, updated_at, version
    FROM bookings
"#;

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn save(&self, booking: &Booking) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, client_id, owner_id, post_id, status, total_amount, currency,
                start_date, end_date, guest_count, created_at, updated_at, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(booking.client_id.as_str())
        .bind(booking.owner_id.as_str())
        .bind(booking.post_id.as_uuid())
        .bind(booking.status.as_str())
        .bind(booking.total_amount)
        .bind(&booking.currency)
        .bind(booking.start_date.as_datetime())
        .bind(booking.end_date.as_datetime())
        .bind(booking.guest_count as i32)
        .bind(booking.created_at.as_datetime())
        .bind(booking.updated_at.as_datetime())
        .bind(booking.version as i64)
        .execute(&self.pool)
        .await
        .map_err(db_error("save booking"))?;

        Ok(())
    }

    async fn update(&self, booking: &Booking) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = $3,
                rejection_reason = $4,
                cancellation_reason = $5,
                cancelled_by = $6,
                penalty_amount = $7,
                accepted_at = $8,
                declined_at = $9,
                paid_at = $10,
                cancelled_at = $11,
                completed_at = $12,
                updated_at = $13,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(booking.version as i64)
        .bind(booking.status.as_str())
        .bind(&booking.rejection_reason)
        .bind(&booking.cancellation_reason)
        .bind(booking.cancelled_by.map(|p| p.as_str()))
        .bind(booking.penalty_amount)
        .bind(booking.accepted_at.map(|t| *t.as_datetime()))
        .bind(booking.declined_at.map(|t| *t.as_datetime()))
        .bind(booking.paid_at.map(|t| *t.as_datetime()))
        .bind(booking.cancelled_at.map(|t| *t.as_datetime()))
        .bind(booking.completed_at.map(|t| *t.as_datetime()))
        .bind(booking.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("update booking"))?;

        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT version FROM bookings WHERE id = $1")
                .bind(booking.id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("check booking version"))?;
            return Err(match exists {
                None => DomainError::new(ErrorCode::BookingNotFound, "Booking not found"),
                Some(_) => DomainError::new(
                    ErrorCode::ConcurrentModification,
                    "Booking was modified concurrently",
                ),
            });
        }

        Ok(booking.version + 1)
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError> {
        let query = format!("{} WHERE id = $1", SELECT_COLUMNS);
        let row: Option<BookingRow> = sqlx::query_as(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find booking"))?;

        row.map(Booking::try_from).transpose()
    }

    async fn count_by_client(&self, client_id: &UserId) -> Result<u32, DomainError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE client_id = $1")
            .bind(client_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count bookings"))?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}
