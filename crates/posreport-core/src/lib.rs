//! # posreport-core: Pure Report Logic
//!
//! Domain types and report assembly for the POS report service. Every
//! function here is deterministic and free of I/O; the database crate
//! fetches raw rows and hands them to this crate to be shaped into reports.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      POS Report Architecture                            │
//! │                                                                         │
//! │  Browser UI ──► report-api (axum) ──► posreport-db ──► SQLite / PG     │
//! │                        │                    │                           │
//! │                        ▼                    ▼                           │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             ★ posreport-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  report   │  │ validation│  │   │
//! │  │   │  Tenant   │  │   Money   │  │  Ledger   │  │   rules   │  │   │
//! │  │   │  Account  │  │           │  │  Aging    │  │   checks  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Master and tenant records, enumerations
//! - [`money`] - Money type with integer arithmetic
//! - [`report`] - Ledger, cash book, trial balance, aging, registers, stock
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use posreport_core::report::AgingBucket;
//!
//! assert_eq!(AgingBucket::for_days(0), AgingBucket::Current);
//! assert_eq!(AgingBucket::for_days(45), AgingBucket::Days31To60);
//! assert_eq!(AgingBucket::for_days(120), AgingBucket::Over90);
//! ```

pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

/// Longest date range a register, ledger or cash book query may span.
pub const MAX_REPORT_SPAN_DAYS: i64 = 366;

/// Date format used in tenant databases and query strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
