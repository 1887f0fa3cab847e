//! # Tenant Database Pools
//!
//! Builds and caches one connection pool per tenant database. A tenant row
//! in the master catalog names its engine and connection string; this module
//! turns that into a live [`AnyPool`] so report queries run unchanged on
//! either engine.
//!
//! ## Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      TenantPools::get(tenant)                           │
//! │                                                                         │
//! │  tenant.is_active? ──no──► DbError::TenantInactive                     │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  cache[tenant.id] ──hit, same provider + connection──► clone pool      │
//! │       │ miss / changed                                                  │
//! │       ▼                                                                 │
//! │  connection_url(tenant)                                                │
//! │    sqlite   : relative path ─► <data_dir>/<path>                       │
//! │               absolute path / sqlite: URL ─► as given                  │
//! │    postgres : postgres:// or postgresql:// URL ─► as given             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AnyPoolOptions::connect(url) ─► cache[tenant.id] = pool               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Connection strings may carry credentials and are never logged.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use posreport_core::validation::validate_connection_string;
use posreport_core::{DbProvider, Tenant};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::catalog::CatalogRepository;
use crate::repository::report::ReportRepository;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct TenantPoolConfig {
    /// Base directory for relative SQLite tenant paths.
    pub data_dir: PathBuf,

    /// Connections per tenant pool.
    /// Default: 5
    pub max_connections: u32,

    /// Default: 10 seconds
    pub connect_timeout: Duration,

    /// Default: 5 minutes
    pub idle_timeout: Duration,
}

impl TenantPoolConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        TenantPoolConfig {
            data_dir: data_dir.into(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

// =============================================================================
// Tenant Handle
// =============================================================================

/// A connected tenant database.
#[derive(Debug, Clone)]
pub struct TenantDb {
    tenant_id: String,
    provider: DbProvider,
    pool: AnyPool,
}

impl TenantDb {
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn provider(&self) -> DbProvider {
        self.provider
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Report queries.
    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }

    /// Chart of accounts, parties, items, and document writers.
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Pool Cache
// =============================================================================

#[derive(Debug)]
struct CachedPool {
    provider: DbProvider,
    connection_string: String,
    db: TenantDb,
}

impl CachedPool {
    fn matches(&self, tenant: &Tenant) -> bool {
        self.provider == tenant.db_provider && self.connection_string == tenant.connection_string
    }
}

/// Factory and cache of tenant pools, keyed by tenant id.
///
/// Shared across request handlers behind an `Arc`. The cache lock is only
/// held for map access, never across a connect or a query.
#[derive(Debug, Clone)]
pub struct TenantPools {
    config: TenantPoolConfig,
    pools: Arc<RwLock<HashMap<String, CachedPool>>>,
}

impl TenantPools {
    pub fn new(config: TenantPoolConfig) -> Self {
        // Registers the SQLite and PostgreSQL drivers with `Any`. Idempotent.
        sqlx::any::install_default_drivers();

        TenantPools {
            config,
            pools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &TenantPoolConfig {
        &self.config
    }

    /// Resolves a tenant's stored connection string into a driver URL.
    ///
    /// ## Rules
    /// - SQLite paths are resolved against `data_dir` unless absolute;
    ///   `sqlite:` URLs pass through
    /// - PostgreSQL strings must already be `postgres://` / `postgresql://`
    pub fn connection_url(&self, tenant: &Tenant) -> DbResult<String> {
        let raw = tenant.connection_string.trim();
        validate_connection_string(tenant.db_provider, raw)
            .map_err(|e| DbError::InvalidConnection(e.to_string()))?;

        match tenant.db_provider {
            DbProvider::Sqlite => {
                if raw.starts_with("sqlite:") {
                    return Ok(raw.to_string());
                }
                let path = Path::new(raw);
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    self.config.data_dir.join(path)
                };
                Ok(format!("sqlite://{}?mode=rwc", path.display()))
            }
            DbProvider::Postgres => Ok(raw.to_string()),
        }
    }

    /// Returns the pool for an active tenant, connecting on first use.
    ///
    /// ## Errors
    /// - [`DbError::TenantInactive`] for switched-off tenants
    /// - [`DbError::InvalidConnection`] / [`DbError::ConnectionFailed`]
    pub async fn get(&self, tenant: &Tenant) -> DbResult<TenantDb> {
        if !tenant.is_active {
            return Err(DbError::TenantInactive {
                code: tenant.code.clone(),
            });
        }
        self.pool_for(tenant).await
    }

    /// Drops the cached pool for a tenant and closes its connections.
    ///
    /// Returns `true` when a pool was cached.
    pub async fn evict(&self, tenant_id: &str) -> bool {
        let removed = self.pools.write().await.remove(tenant_id);
        match removed {
            Some(cached) => {
                info!(tenant_id = %tenant_id, "Evicting tenant pool");
                cached.db.pool.close().await;
                true
            }
            None => false,
        }
    }

    /// Applies the tenant schema migrations. Works on inactive tenants so a
    /// database can be prepared before it is switched on.
    pub async fn initialize(&self, tenant: &Tenant) -> DbResult<()> {
        info!(tenant_id = %tenant.id, code = %tenant.code, "Initializing tenant schema");
        let db = self.pool_for(tenant).await?;
        migrations::run_tenant_migrations(db.pool()).await
    }

    /// Number of pools currently cached.
    pub async fn cached(&self) -> usize {
        self.pools.read().await.len()
    }

    /// Closes every cached pool (shutdown).
    pub async fn close_all(&self) {
        let drained: Vec<CachedPool> = self.pools.write().await.drain().map(|(_, v)| v).collect();
        for cached in drained {
            cached.db.pool.close().await;
        }
    }

    async fn pool_for(&self, tenant: &Tenant) -> DbResult<TenantDb> {
        if let Some(db) = self.lookup(tenant).await {
            return Ok(db);
        }

        let url = self.connection_url(tenant)?;
        debug!(tenant_id = %tenant.id, provider = %tenant.db_provider, "Connecting tenant pool");

        // Connect without the cache lock: a slow tenant server must not hold
        // up requests for other tenants.
        let pool = AnyPoolOptions::new()
            .max_connections(self.config.max_connections)
            .acquire_timeout(self.config.connect_timeout)
            .idle_timeout(Some(self.config.idle_timeout))
            .connect(&url)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = TenantDb {
            tenant_id: tenant.id.clone(),
            provider: tenant.db_provider,
            pool,
        };

        let mut pools = self.pools.write().await;

        // Another request connected first; keep its pool.
        if let Some(cached) = pools.get(&tenant.id) {
            if cached.matches(tenant) {
                let winner = cached.db.clone();
                drop(pools);
                db.pool.close().await;
                return Ok(winner);
            }
        }

        let previous = pools.insert(
            tenant.id.clone(),
            CachedPool {
                provider: tenant.db_provider,
                connection_string: tenant.connection_string.clone(),
                db: db.clone(),
            },
        );
        drop(pools);

        if let Some(stale) = previous {
            info!(tenant_id = %tenant.id, "Tenant connection changed, replacing pool");
            stale.db.pool.close().await;
        }

        info!(tenant_id = %tenant.id, provider = %tenant.db_provider, "Tenant pool ready");
        Ok(db)
    }

    async fn lookup(&self, tenant: &Tenant) -> Option<TenantDb> {
        let pools = self.pools.read().await;
        pools
            .get(&tenant.id)
            .filter(|cached| cached.matches(tenant))
            .map(|cached| cached.db.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
