//! # Domain Types
//!
//! Records held in the master catalog and in tenant databases.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Master database (SQLite)          Tenant database (SQLite / PG)        │
//! │  ────────────────────────          ─────────────────────────────        │
//! │  Tenant ──┬── User                 Account ◄── Party                    │
//! │           │                           ▲                                 │
//! │  SuperAdmin                           │                                 │
//! │                                    LedgerEntry ──► Voucher / Invoice    │
//! │  Session (user or super-admin)     Item ◄── InvoiceLine                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Enumerations are stored as lowercase snake_case text in both databases;
//! `as_str` / `FromStr` are the only conversions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::MAX_REPORT_SPAN_DAYS;

/// Declares a text-backed enum with `as_str`, `Display` and `FromStr`.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
        #[serde(rename_all = "snake_case")]
        #[ts(export)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(CoreError::unknown_variant($kind, other)),
                }
            }
        }
    };
}

// =============================================================================
// Enumerations
// =============================================================================

text_enum! {
    /// Engine backing a tenant database.
    DbProvider, "database provider" {
        /// Embedded file database.
        Sqlite => "sqlite",
        /// Network database server.
        Postgres => "postgres",
    }
}

text_enum! {
    /// Who a session or token belongs to.
    PrincipalKind, "principal kind" {
        User => "user",
        SuperAdmin => "super_admin",
    }
}

text_enum! {
    /// Top-level classification in the chart of accounts.
    AccountType, "account type" {
        Asset => "asset",
        Liability => "liability",
        Equity => "equity",
        Income => "income",
        Expense => "expense",
    }
}

text_enum! {
    PartyType, "party type" {
        Customer => "customer",
        Supplier => "supplier",
    }
}

text_enum! {
    /// Kind of trading document.
    InvoiceType, "invoice type" {
        Sale => "sale",
        Purchase => "purchase",
        SaleReturn => "sale_return",
        PurchaseReturn => "purchase_return",
    }
}

impl InvoiceType {
    /// Returns documents reverse the direction of their parent type.
    pub const fn is_return(&self) -> bool {
        matches!(self, InvoiceType::SaleReturn | InvoiceType::PurchaseReturn)
    }
}

text_enum! {
    VoucherType, "voucher type" {
        CashReceipt => "cash_receipt",
        CashPayment => "cash_payment",
        BankReceipt => "bank_receipt",
        BankPayment => "bank_payment",
        Journal => "journal",
    }
}

text_enum! {
    /// Which side of the book an aging report covers.
    AgingKind, "aging kind" {
        /// Customer balances (sale invoices).
        Receivable => "receivable",
        /// Supplier balances (purchase invoices).
        Payable => "payable",
    }
}

impl AgingKind {
    /// Invoice type whose open balances feed this report.
    pub const fn invoice_type(&self) -> InvoiceType {
        match self {
            AgingKind::Receivable => InvoiceType::Sale,
            AgingKind::Payable => InvoiceType::Purchase,
        }
    }
}

// =============================================================================
// Master Records
// =============================================================================

/// One customer's company database, as registered in the master catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tenant {
    pub id: String,
    /// Short code users type at signup.
    pub code: String,
    pub name: String,
    pub db_provider: DbProvider,
    /// File path (SQLite) or server URL (PostgreSQL).
    pub connection_string: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A tenant user allowed to view reports.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: String,
    pub tenant_id: String,
    pub username: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Platform operator who provisions tenants and accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperAdmin {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A login session. Tokens carry the session id; revoking the row logs the
/// holder out everywhere the token is presented.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub principal_id: String,
    pub principal_kind: PrincipalKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

// =============================================================================
// Tenant Records
// =============================================================================

/// An account in the tenant's chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Account {
    pub id: String,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    /// Cash-in-hand accounts make up the cash book.
    pub is_cash: bool,
    /// Signed opening balance, positive = debit.
    pub opening_balance: Money,
    pub is_active: bool,
}

/// A customer or supplier, each backed by its own ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Party {
    pub id: String,
    pub code: String,
    pub name: String,
    pub party_type: PartyType,
    pub account_id: String,
    pub phone: Option<String>,
    /// Days after the invoice date until payment falls due.
    pub credit_days: i64,
}

/// A stocked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Item {
    pub id: String,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub cost: Money,
    pub price: Money,
    pub opening_qty: i64,
    pub is_active: bool,
}

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive reporting period. Deserializing goes through [`DateRange::new`]
/// so the same bounds apply to ranges read back from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(try_from = "RangeBounds")]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
}

#[derive(Deserialize)]
struct RangeBounds {
    from: NaiveDate,
    to: NaiveDate,
}

impl TryFrom<RangeBounds> for DateRange {
    type Error = ValidationError;

    fn try_from(bounds: RangeBounds) -> Result<Self, Self::Error> {
        DateRange::new(bounds.from, bounds.to)
    }
}

impl DateRange {
    /// Builds a range, rejecting inverted or over-long periods.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ValidationError> {
        if from > to {
            return Err(ValidationError::InvertedRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        let range = DateRange { from, to };
        if range.days() > MAX_REPORT_SPAN_DAYS {
            return Err(ValidationError::OutOfRange {
                field: "date range (days)".to_string(),
                min: 1,
                max: MAX_REPORT_SPAN_DAYS,
            });
        }
        Ok(range)
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Parses a stored `YYYY-MM-DD` value.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value, crate::DATE_FORMAT).map_err(|_| CoreError::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_text_enum_round_trip() {
        for kind in InvoiceType::ALL {
            assert_eq!(kind.as_str().parse::<InvoiceType>().unwrap(), *kind);
        }
        assert_eq!("postgres".parse::<DbProvider>().unwrap(), DbProvider::Postgres);
        assert!("mssql".parse::<DbProvider>().is_err());
    }

    #[test]
    fn test_serde_matches_storage_text() {
        let json = serde_json::to_string(&VoucherType::CashReceipt).unwrap();
        assert_eq!(json, "\"cash_receipt\"");
        assert_eq!(VoucherType::CashReceipt.as_str(), "cash_receipt");
    }

    #[test]
    fn test_invoice_type_is_return() {
        assert!(InvoiceType::SaleReturn.is_return());
        assert!(!InvoiceType::Purchase.is_return());
    }

    #[test]
    fn test_date_range() {
        let range = DateRange::new(date("2026-01-01"), date("2026-01-31")).unwrap();
        assert_eq!(range.days(), 31);
        assert!(range.contains(date("2026-01-15")));
        assert!(!range.contains(date("2026-02-01")));

        let single = DateRange::new(date("2026-03-05"), date("2026-03-05")).unwrap();
        assert_eq!(single.days(), 1);
    }

    #[test]
    fn test_date_range_rejects_inverted_and_long() {
        assert!(matches!(
            DateRange::new(date("2026-02-01"), date("2026-01-01")),
            Err(ValidationError::InvertedRange { .. })
        ));

        let from = date("2025-01-01");
        assert!(DateRange::new(from, from + Duration::days(365)).is_ok());
        assert!(DateRange::new(from, from + Duration::days(366)).is_err());
    }

    #[test]
    fn test_date_range_deserialize_is_checked() {
        let range: DateRange = serde_json::from_str(r#"{"from":"2026-01-01","to":"2026-01-31"}"#).unwrap();
        assert_eq!(range.days(), 31);

        assert!(serde_json::from_str::<DateRange>(r#"{"from":"2026-02-01","to":"2026-01-01"}"#).is_err());
        assert!(serde_json::from_str::<DateRange>(r#"{"from":"2024-01-01","to":"2026-01-01"}"#).is_err());
    }

    #[test]
    fn test_session_activity() {
        let now = Utc::now();
        let mut session = Session {
            id: "s1".to_string(),
            principal_id: "u1".to_string(),
            principal_kind: PrincipalKind::User,
            issued_at: now,
            expires_at: now + Duration::hours(1),
            revoked_at: None,
        };
        assert!(session.is_active_at(now));
        assert!(!session.is_active_at(now + Duration::hours(2)));

        session.revoked_at = Some(now);
        assert!(!session.is_active_at(now));
    }

    #[test]
    fn test_user_hash_not_serialized() {
        let user = User {
            id: "u1".to_string(),
            tenant_id: "t1".to_string(),
            username: "cashier".to_string(),
            email: None,
            display_name: None,
            password_hash: "$argon2id$secret".to_string(),
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
    }
}
