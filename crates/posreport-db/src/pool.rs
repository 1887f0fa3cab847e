//! # Master Database Pool
//!
//! Connection pool for the master catalog (tenants, users, super-admins,
//! sessions). The catalog is a single SQLite file owned by the API process.
//!
//! ## Layout
//! ```text
//!   master.db (SQLite, WAL)
//!   ├── tenants        code, name, db kind, connection string, active flag
//!   ├── users          tenant_id, username, argon2 hash, active flag
//!   ├── super_admins   platform operators
//!   └── sessions       one row per login, checked on every request
//!
//!   MasterDbConfig ──► MasterDb::new ──► migrate ──► repositories
//! ```
//!
//! ## WAL Mode
//! Every authenticated request reads the sessions table while logins write
//! to it; WAL keeps those readers off the writer's lock.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::admin::SuperAdminRepository;
use crate::repository::session::SessionRepository;
use crate::repository::tenant::TenantRepository;
use crate::repository::user::UserRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Settings for opening the master catalog.
///
/// ```rust,ignore
/// let config = MasterDbConfig::new("/var/lib/posreport/master.db")
///     .max_connections(10);
/// ```
#[derive(Debug, Clone)]
pub struct MasterDbConfig {
    /// Catalog file, created on first open.
    pub database_path: PathBuf,

    /// Upper bound on pooled connections (10).
    pub max_connections: u32,

    /// Connections held open while idle (1).
    pub min_connections: u32,

    /// How long to wait for a connection before failing (30s).
    pub connect_timeout: Duration,

    /// Idle connections above the minimum are dropped after this (10m).
    pub idle_timeout: Duration,

    /// Apply pending master migrations while opening (true).
    pub run_migrations: bool,
}

impl MasterDbConfig {
    /// Defaults for a catalog stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MasterDbConfig {
            database_path: path.into(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Overrides the pool ceiling.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Overrides the idle floor.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Overrides the acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Skips or applies migrations on open.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Throwaway catalog for tests. Pinned to one connection: a second
    /// `:memory:` connection would open a different, empty database.
    pub fn in_memory() -> Self {
        MasterDbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Master Database
// =============================================================================

/// Handle to the master catalog. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MasterDb {
    pool: SqlitePool,
}

impl MasterDb {
    /// Creates the master connection pool.
    ///
    /// The file is created when missing; WAL, NORMAL sync and foreign keys
    /// are switched on for every connection before migrations run.
    pub async fn new(config: MasterDbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening master catalog");

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Off by default in SQLite
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Master pool ready");

        let db = MasterDb { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Opens a fresh in-memory master database with migrations applied.
    pub async fn in_memory() -> DbResult<Self> {
        Self::new(MasterDbConfig::in_memory()).await
    }

    /// Runs master migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_master_migrations(&self.pool).await
    }

    /// Underlying pool, for ad-hoc queries in tests and tools.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn tenants(&self) -> TenantRepository {
        TenantRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn admins(&self) -> SuperAdminRepository {
        SuperAdminRepository::new(self.pool.clone())
    }

    pub fn sessions(&self) -> SessionRepository {
        SessionRepository::new(self.pool.clone())
    }

    /// Closes the pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Master catalog closed");
        self.pool.close().await;
    }

    /// `true` while the catalog answers `SELECT 1`.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// `(total, applied)` master migration counts.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::master_migration_status(&self.pool).await
    }
}

// =============================================================================
// Tests
// =============================================================================
