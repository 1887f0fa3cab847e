//! # Repository Module
//!
//! Database repository implementations for the master catalog and tenant
//! databases.
//!
//! ## Repository Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  MasterDb (SqlitePool)              TenantDb (AnyPool)                  │
//! │  ├── tenants()  TenantRepository    ├── reports()  ReportRepository     │
//! │  ├── users()    UserRepository      └── catalog()  CatalogRepository    │
//! │  ├── admins()   SuperAdminRepository                                    │
//! │  └── sessions() SessionRepository                                       │
//! │                                                                         │
//! │  Rows are read into private `*Row` structs (sqlx::FromRow) and         │
//! │  converted into posreport-core types; enum text and dates are parsed   │
//! │  on the way out so corrupt rows surface as DbError::Corrupt.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod admin;
pub mod catalog;
pub mod report;
pub mod session;
pub mod tenant;
pub mod user;

use chrono::NaiveDate;
use posreport_core::DATE_FORMAT;

/// Formats a date the way tenant tables store it.
pub(crate) fn date_text(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Tenant flags are stored as BIGINT 0/1 on both engines.
pub(crate) fn flag(value: bool) -> i64 {
    i64::from(value)
}
