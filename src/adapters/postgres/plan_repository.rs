//! PostgreSQL implementation of PlanRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, PlanId};
use crate::domain::subscription::{BillingCycle, Plan};
use crate::ports::PlanRepository;

use super::db_error;

pub struct PostgresPlanRepository {
    pool: PgPool,
}

impl PostgresPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: String,
    name: String,
    price: i64,
    currency: String,
    billing_cycle: String,
    max_posts: Option<i32>,
    max_bookings: Option<i32>,
}

fn limit(raw: Option<i32>) -> Option<u32> {
    raw.map(|value| u32::try_from(value).unwrap_or(0))
}

impl TryFrom<PlanRow> for Plan {
    type Error = DomainError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let billing_cycle = BillingCycle::parse(&row.billing_cycle).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid billing cycle: {}", row.billing_cycle),
            )
        })?;
        let id = PlanId::new(row.id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid plan id: {}", e))
        })?;
        Ok(Plan {
            id,
            name: row.name,
            price: row.price,
            currency: row.currency,
            billing_cycle,
            max_posts: limit(row.max_posts),
            max_bookings: limit(row.max_bookings),
        })
    }
}

#[async_trait]
impl PlanRepository for PostgresPlanRepository {
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(
            r#"
            SELECT id, name, price, currency, billing_cycle, max_posts, max_bookings
            FROM plans
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find plan"))?;

        row.map(Plan::try_from).transpose()
    }
}
