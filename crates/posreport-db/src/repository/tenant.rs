//! # Tenant Repository
//!
//! Master catalog operations for tenants.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use posreport_core::{DbProvider, Tenant};

#[derive(Debug, sqlx::FromRow)]
struct TenantRow {
    id: String,
    code: String,
    name: String,
    db_provider: String,
    connection_string: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = DbError;

    fn try_from(row: TenantRow) -> DbResult<Self> {
        Ok(Tenant {
            id: row.id,
            code: row.code,
            name: row.name,
            db_provider: row.db_provider.parse()?,
            connection_string: row.connection_string,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_TENANT: &str = r#"
    SELECT id, code, name, db_provider, connection_string, is_active, created_at, updated_at
    FROM tenants
"#;

/// Fields for registering a tenant.
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub code: String,
    pub name: String,
    pub db_provider: DbProvider,
    pub connection_string: String,
    pub is_active: bool,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub db_provider: Option<DbProvider>,
    pub connection_string: Option<String>,
    pub is_active: Option<bool>,
}

impl TenantUpdate {
    /// Whether the update touches anything a cached pool depends on.
    pub fn affects_connection(&self) -> bool {
        self.db_provider.is_some() || self.connection_string.is_some() || self.is_active == Some(false)
    }
}

/// Repository for tenant records.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    pool: SqlitePool,
}

impl TenantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TenantRepository { pool }
    }

    /// Registers a tenant. Codes are unique ignoring case.
    pub async fn create(&self, new: &NewTenant) -> DbResult<Tenant> {
        let now = Utc::now();
        let tenant = Tenant {
            id: Uuid::new_v4().to_string(),
            code: new.code.trim().to_string(),
            name: new.name.trim().to_string(),
            db_provider: new.db_provider,
            connection_string: new.connection_string.trim().to_string(),
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %tenant.id, code = %tenant.code, "Creating tenant");

        sqlx::query(
            r#"
            INSERT INTO tenants (
                id, code, name, db_provider, connection_string, is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&tenant.id)
        .bind(&tenant.code)
        .bind(&tenant.name)
        .bind(tenant.db_provider.as_str())
        .bind(&tenant.connection_string)
        .bind(tenant.is_active)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("tenant code", &tenant.code),
            other => other,
        })?;

        Ok(tenant)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Tenant>> {
        let row: Option<TenantRow> = sqlx::query_as(&format!("{SELECT_TENANT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Tenant::try_from).transpose()
    }

    /// Looks a tenant up by code, ignoring case.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Tenant>> {
        let row: Option<TenantRow> = sqlx::query_as(&format!("{SELECT_TENANT} WHERE code = $1"))
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Tenant::try_from).transpose()
    }

    /// All tenants ordered by code.
    pub async fn list(&self) -> DbResult<Vec<Tenant>> {
        let rows: Vec<TenantRow> = sqlx::query_as(&format!("{SELECT_TENANT} ORDER BY code"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Tenant::try_from).collect()
    }

    /// Applies a partial update and returns the stored result.
    pub async fn update(&self, id: &str, update: &TenantUpdate) -> DbResult<Tenant> {
        let mut tenant = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Tenant", id))?;

        if let Some(name) = &update.name {
            tenant.name = name.trim().to_string();
        }
        if let Some(provider) = update.db_provider {
            tenant.db_provider = provider;
        }
        if let Some(connection) = &update.connection_string {
            tenant.connection_string = connection.trim().to_string();
        }
        if let Some(active) = update.is_active {
            tenant.is_active = active;
        }
        tenant.updated_at = Utc::now();

        debug!(id = %tenant.id, is_active = tenant.is_active, "Updating tenant");

        sqlx::query(
            r#"
            UPDATE tenants
            SET name = $1, db_provider = $2, connection_string = $3, is_active = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&tenant.name)
        .bind(tenant.db_provider.as_str())
        .bind(&tenant.connection_string)
        .bind(tenant.is_active)
        .bind(tenant.updated_at)
        .bind(&tenant.id)
        .execute(&self.pool)
        .await?;

        Ok(tenant)
    }

    /// Removes a tenant registration. Fails with a foreign-key violation
    /// while users still belong to it. Returns `false` for unknown ids.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting tenant");

        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MasterDb;

    fn acme() -> NewTenant {
        NewTenant {
            code: "ACME".to_string(),
            name: "Acme Traders".to_string(),
            db_provider: DbProvider::Sqlite,
            connection_string: "acme.db".to_string(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let db = MasterDb::in_memory().await.unwrap();
        let repo = db.tenants();

        let created = repo.create(&acme()).await.unwrap();

        let by_id = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.code, "ACME");
        assert_eq!(by_id.db_provider, DbProvider::Sqlite);

        let by_code = repo.get_by_code("acme").await.unwrap().unwrap();
        assert_eq!(by_code.id, created.id);

        assert!(repo.get_by_code("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = MasterDb::in_memory().await.unwrap();
        let repo = db.tenants();

        repo.create(&acme()).await.unwrap();
        let mut again = acme();
        again.code = "acme".to_string();

        let err = repo.create(&again).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_and_list() {
        let db = MasterDb::in_memory().await.unwrap();
        let repo = db.tenants();

        let created = repo.create(&acme()).await.unwrap();
        let mut beta = acme();
        beta.code = "BETA".to_string();
        repo.create(&beta).await.unwrap();

        let update = TenantUpdate {
            connection_string: Some("postgres://pos@db/acme".to_string()),
            db_provider: Some(DbProvider::Postgres),
            is_active: Some(false),
            ..Default::default()
        };
        assert!(update.affects_connection());

        let updated = repo.update(&created.id, &update).await.unwrap();
        assert_eq!(updated.db_provider, DbProvider::Postgres);
        assert!(!updated.is_active);
        assert_eq!(updated.name, "Acme Traders");

        let codes: Vec<String> = repo.list().await.unwrap().into_iter().map(|t| t.code).collect();
        assert_eq!(codes, vec!["ACME", "BETA"]);

        assert!(matches!(
            repo.update("missing", &TenantUpdate::default()).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[test]
    fn test_rename_does_not_affect_connection() {
        let update = TenantUpdate {
            name: Some("Renamed".to_string()),
            is_active: Some(true),
            ..Default::default()
        };
        assert!(!update.affects_connection());
    }

    #[tokio::test]
    async fn test_delete_frees_code() {
        let db = MasterDb::in_memory().await.unwrap();
        let repo = db.tenants();

        let created = repo.create(&acme()).await.unwrap();
        assert!(repo.delete(&created.id).await.unwrap());
        assert!(!repo.delete(&created.id).await.unwrap());
        assert!(repo.get_by_code("ACME").await.unwrap().is_none());

        repo.create(&acme()).await.unwrap();
    }
}
