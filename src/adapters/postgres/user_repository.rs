//! PostgreSQL implementation of UserRepository.
//!
//! Roles live in `user_roles`, one row per (user, role). Revoked roles are
//! kept with `is_active = false`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entitlement::{Role, RoleAssignment, User};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::UserRepository;

use super::db_error;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    role: String,
    is_active: bool,
    assigned_at: DateTime<Utc>,
    assigned_by: String,
}

impl TryFrom<RoleRow> for RoleAssignment {
    type Error = DomainError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid role: {}", row.role))
        })?;
        Ok(RoleAssignment {
            role,
            is_active: row.is_active,
            assigned_at: Timestamp::from_datetime(row.assigned_at),
            assigned_by: row.assigned_by,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let connected: Option<(bool,)> =
            sqlx::query_as("SELECT payment_account_connected FROM users WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find user"))?;

        let Some((payment_account_connected,)) = connected else {
            return Ok(None);
        };

        let rows: Vec<RoleRow> = sqlx::query_as(
            r#"
            SELECT role, is_active, assigned_at, assigned_by
            FROM user_roles
            WHERE user_id = $1
            ORDER BY role
            "#,
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load user roles"))?;

        let roles = rows
            .into_iter()
            .map(RoleAssignment::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(User {
            id: id.clone(),
            roles,
            payment_account_connected,
        }))
    }

    async fn save_roles(&self, user: &User) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let touched = sqlx::query("UPDATE users SET updated_at = NOW() WHERE id = $1")
            .bind(user.id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error("touch user"))?
            .rows_affected();

        if touched == 0 {
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("User not found: {}", user.id),
            ));
        }

        for assignment in &user.roles {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role, is_active, assigned_at, assigned_by)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id, role) DO UPDATE SET
                    is_active = EXCLUDED.is_active,
                    assigned_at = EXCLUDED.assigned_at,
                    assigned_by = EXCLUDED.assigned_by
                "#,
            )
            .bind(user.id.as_str())
            .bind(assignment.role.as_str())
            .bind(assignment.is_active)
            .bind(assignment.assigned_at.as_datetime())
            .bind(&assignment.assigned_by)
            .execute(&mut *tx)
            .await
            .map_err(db_error("save user role"))?;
        }

        tx.commit().await.map_err(db_error("commit user roles"))?;
        Ok(())
    }
}
