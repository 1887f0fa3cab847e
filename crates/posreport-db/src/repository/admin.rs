//! # Super-Admin Repository
//!
//! Platform operators. The first one is created from configured bootstrap
//! credentials when the table is empty.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use posreport_core::SuperAdmin;

#[derive(Debug, sqlx::FromRow)]
struct SuperAdminRow {
    id: String,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<SuperAdminRow> for SuperAdmin {
    fn from(row: SuperAdminRow) -> Self {
        SuperAdmin {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SuperAdminRepository {
    pool: SqlitePool,
}

impl SuperAdminRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SuperAdminRepository { pool }
    }

    /// Creates a super-admin. The password must already be hashed.
    pub async fn create(&self, username: &str, password_hash: &str) -> DbResult<SuperAdmin> {
        let admin = SuperAdmin {
            id: Uuid::new_v4().to_string(),
            username: username.trim().to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO super_admins (id, username, password_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&admin.id)
        .bind(&admin.username)
        .bind(&admin.password_hash)
        .bind(admin.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("username", &admin.username),
            other => other,
        })?;

        info!(id = %admin.id, username = %admin.username, "Super-admin created");
        Ok(admin)
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<SuperAdmin>> {
        let row: Option<SuperAdminRow> = sqlx::query_as(
            "SELECT id, username, password_hash, created_at FROM super_admins WHERE username = $1",
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SuperAdmin::from))
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SuperAdmin>> {
        let row: Option<SuperAdminRow> = sqlx::query_as(
            "SELECT id, username, password_hash, created_at FROM super_admins WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SuperAdmin::from))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM super_admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
