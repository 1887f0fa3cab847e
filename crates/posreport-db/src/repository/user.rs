//! # User Repository
//!
//! Master catalog operations for tenant users.
//!
//! ## User Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  signup ───────────► inactive ──(admin activates)──► active            │
//! │  admin provisioning ───────────────────────────────► active            │
//! │  active ──(admin deactivates)──► inactive, sessions revoked by caller  │
//! │  each successful login ──► touch_last_login                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use posreport_core::User;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    tenant_id: String,
    username: String,
    email: Option<String>,
    display_name: Option<String>,
    password_hash: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            tenant_id: row.tenant_id,
            username: row.username,
            email: row.email,
            display_name: row.display_name,
            password_hash: row.password_hash,
            is_active: row.is_active,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        }
    }
}

const SELECT_USER: &str = r#"
    SELECT id, tenant_id, username, email, display_name, password_hash,
           is_active, created_at, last_login_at
    FROM users
"#;

/// Fields for creating a user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub tenant_id: String,
    pub username: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub password_hash: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a user. Usernames are unique across all tenants, ignoring case.
    pub async fn create(&self, new: &NewUser) -> DbResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            tenant_id: new.tenant_id.clone(),
            username: new.username.trim().to_string(),
            email: new.email.as_deref().map(str::trim).filter(|e| !e.is_empty()).map(str::to_string),
            display_name: new
                .display_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            password_hash: new.password_hash.clone(),
            is_active: new.is_active,
            created_at: Utc::now(),
            last_login_at: None,
        };

        debug!(id = %user.id, tenant_id = %user.tenant_id, username = %user.username, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, tenant_id, username, email, display_name, password_hash,
                is_active, created_at, last_login_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NULL)
            "#,
        )
        .bind(&user.id)
        .bind(&user.tenant_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("username", &user.username),
            DbError::ForeignKeyViolation { .. } => DbError::not_found("Tenant", &user.tenant_id),
            other => other,
        })?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    /// Looks a user up by login name, ignoring case.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE username = $1"))
            .bind(username.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    /// All users of a tenant ordered by username.
    pub async fn list_by_tenant(&self, tenant_id: &str) -> DbResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("{SELECT_USER} WHERE tenant_id = $1 ORDER BY username"))
                .bind(tenant_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Switches a user on or off and returns the updated record.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<User> {
        let result = sqlx::query("UPDATE users SET is_active = $1 WHERE id = $2")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        debug!(id = %id, active, "User activation changed");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Records a successful login.
    pub async fn touch_last_login(&self, id: &str) -> DbResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
