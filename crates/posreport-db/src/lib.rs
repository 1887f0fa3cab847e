//! # posreport-db: Database Layer for the POS Report Service
//!
//! Master catalog access and per-tenant database pooling.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        POS Report Data Flow                             │
//! │                                                                         │
//! │  axum handler (GET /api/reports/trial-balance)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  posreport-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   MasterDb    │    │  TenantPools  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (tenant.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ AnyPool cache │    │ master/      │  │   │
//! │  │   │ tenants/users │───►│ per tenant id │    │ tenant/      │  │   │
//! │  │   │ sessions      │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │                 tenant database: SQLite file or PostgreSQL             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Master connection pool
//! - [`tenant`] - Tenant pool factory and cache
//! - [`migrations`] - Embedded master and tenant migrations
//! - [`error`] - Database error types
//! - [`repository`] - Master and tenant repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use posreport_db::{MasterDb, MasterDbConfig, TenantPoolConfig, TenantPools};
//!
//! let master = MasterDb::new(MasterDbConfig::new("master.db")).await?;
//! let pools = TenantPools::new(TenantPoolConfig::new("./tenants"));
//!
//! let tenant = master.tenants().get_by_code("ACME").await?.unwrap();
//! let db = pools.get(&tenant).await?;
//! let tb = db.reports().trial_balance(as_of, false).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod tenant;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{MasterDb, MasterDbConfig};
pub use tenant::{TenantDb, TenantPoolConfig, TenantPools};

// Repository re-exports for convenience
pub use repository::admin::SuperAdminRepository;
pub use repository::catalog::{
    CatalogRepository, NewInvoice, NewInvoiceLine, NewLedgerEntry, NewVoucher, NewVoucherEntry,
};
pub use repository::report::ReportRepository;
pub use repository::session::SessionRepository;
pub use repository::tenant::{NewTenant, TenantRepository, TenantUpdate};
pub use repository::user::{NewUser, UserRepository};
