//! # Database Migrations
//!
//! Embedded SQL migrations for the master catalog and tenant databases.
//!
//! ## Two Schemas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Migration Sets                                     │
//! │                                                                         │
//! │  migrations/master/   ──► MASTER_MIGRATOR ──► master.db (SQLite)       │
//! │    001_master_schema.sql                      run at every startup      │
//! │                                                                         │
//! │  migrations/tenant/   ──► TENANT_MIGRATOR ──► tenant DB (SQLite / PG)  │
//! │    001_tenant_schema.sql                      run on "initialize"       │
//! │                                                                         │
//! │  Each target tracks applied files in its own _sqlx_migrations table.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Add `NNN_description.sql` to the right directory
//! 2. Tenant files must run unchanged on SQLite and PostgreSQL
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::{AnyPool, SqlitePool};
use tracing::info;

use crate::error::DbResult;

/// Master catalog schema (tenants, users, super-admins, sessions).
static MASTER_MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/master");

/// Tenant company schema (accounts, parties, items, invoices, vouchers).
static TENANT_MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/tenant");

/// Runs all pending master migrations.
///
/// Idempotent: applied files are skipped, each file runs in a transaction.
pub async fn run_master_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending master migrations");
    MASTER_MIGRATOR.run(pool).await?;
    info!("Master migrations applied");
    Ok(())
}

/// Runs all pending tenant migrations on either engine.
pub async fn run_tenant_migrations(pool: &AnyPool) -> DbResult<()> {
    info!("Checking for pending tenant migrations");
    TENANT_MIGRATOR.run(pool).await?;
    info!("Tenant migrations applied");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for the master catalog.
///
/// Used by the health endpoint.
pub async fn master_migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MASTER_MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}

/// Number of tenant migration files embedded in this build.
pub fn tenant_migration_count() -> usize {
    TENANT_MIGRATOR.migrations.len()
}
