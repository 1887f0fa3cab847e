//! # Report Assembly
//!
//! Turns rows fetched from a tenant database into the report DTOs the front
//! end renders. SQL does the filtering and grouping; this module does the
//! arithmetic that has to be exact and ordered (running balances, bucket
//! totals, signed register lines).
//!
//! ## Reports
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Report            Input rows               Output                      │
//! │  ──────            ──────────               ──────                      │
//! │  Ledger            opening + movements      running balance lines       │
//! │  Cash book         opening + movements      receipts / payments         │
//! │  Trial balance     per-account totals       Dr / Cr columns, balanced?  │
//! │  Aging             open invoices            per-party buckets           │
//! │  Register          invoice headers          signed lines + daily totals │
//! │  Stock summary     per-item quantities      closing qty and value       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{AccountType, AgingKind, DateRange, InvoiceType};

// =============================================================================
// Ledger and Cash Book
// =============================================================================

/// Identifies the account a ledger was drawn for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccountRef {
    pub id: String,
    pub code: String,
    pub name: String,
}

/// A single posting as read from `ledger_entries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    pub date: NaiveDate,
    /// Voucher or invoice number the entry came from.
    pub reference: Option<String>,
    pub narration: Option<String>,
    /// Account name, filled in for multi-account books.
    pub account: Option<String>,
    pub debit: Money,
    pub credit: Money,
}

/// A ledger line with the balance after it is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerLine {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub reference: Option<String>,
    pub narration: Option<String>,
    pub account: Option<String>,
    pub debit: Money,
    pub credit: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerReport {
    pub account: AccountRef,
    pub range: DateRange,
    pub opening_balance: Money,
    pub lines: Vec<LedgerLine>,
    pub total_debit: Money,
    pub total_credit: Money,
    pub closing_balance: Money,
}

/// Applies movements to an opening balance in the given order.
fn running_lines(opening: Money, movements: Vec<Movement>) -> (Vec<LedgerLine>, Money, Money, Money) {
    let mut balance = opening;
    let mut total_debit = Money::zero();
    let mut total_credit = Money::zero();

    let lines = movements
        .into_iter()
        .map(|m| {
            balance += m.debit - m.credit;
            total_debit += m.debit;
            total_credit += m.credit;
            LedgerLine {
                date: m.date,
                reference: m.reference,
                narration: m.narration,
                account: m.account,
                debit: m.debit,
                credit: m.credit,
                balance,
            }
        })
        .collect();

    (lines, total_debit, total_credit, balance)
}

/// Builds an account ledger.
///
/// `opening` is the balance at the start of `range.from` (the account's
/// opening balance plus every posting dated before it). Movements must
/// already be in posting order.
///
/// ```rust
/// use chrono::NaiveDate;
/// use posreport_core::report::{build_ledger, AccountRef, Movement};
/// use posreport_core::{DateRange, Money};
///
/// let d = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
/// let range = DateRange::new(d, d).unwrap();
/// let account = AccountRef { id: "a1".into(), code: "1001".into(), name: "Cash".into() };
/// let movements = vec![Movement {
///     date: d,
///     reference: Some("CR-1".into()),
///     narration: None,
///     account: None,
///     debit: Money::from_cents(500),
///     credit: Money::zero(),
/// }];
///
/// let ledger = build_ledger(account, range, Money::from_cents(1000), movements);
/// assert_eq!(ledger.closing_balance.cents(), 1500);
/// ```
pub fn build_ledger(
    account: AccountRef,
    range: DateRange,
    opening: Money,
    movements: Vec<Movement>,
) -> LedgerReport {
    let (lines, total_debit, total_credit, closing_balance) = running_lines(opening, movements);

    LedgerReport {
        account,
        range,
        opening_balance: opening,
        lines,
        total_debit,
        total_credit,
        closing_balance,
    }
}

/// Cash book across every cash-in-hand account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashBook {
    pub range: DateRange,
    pub accounts: Vec<AccountRef>,
    pub opening_balance: Money,
    pub lines: Vec<LedgerLine>,
    /// Debits to cash.
    pub total_receipts: Money,
    /// Credits to cash.
    pub total_payments: Money,
    pub closing_balance: Money,
}

pub fn build_cash_book(
    range: DateRange,
    accounts: Vec<AccountRef>,
    opening: Money,
    movements: Vec<Movement>,
) -> CashBook {
    let (lines, total_receipts, total_payments, closing_balance) = running_lines(opening, movements);

    CashBook {
        range,
        accounts,
        opening_balance: opening,
        lines,
        total_receipts,
        total_payments,
        closing_balance,
    }
}

// =============================================================================
// Trial Balance
// =============================================================================

/// Per-account totals up to the trial balance date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalance {
    pub account_id: String,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub opening: Money,
    pub debits: Money,
    pub credits: Money,
}

impl AccountBalance {
    pub fn closing(&self) -> Money {
        self.opening + self.debits - self.credits
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrialBalanceRow {
    pub account_id: String,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub debit: Money,
    pub credit: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrialBalance {
    #[ts(as = "String")]
    pub as_of: NaiveDate,
    pub rows: Vec<TrialBalanceRow>,
    pub total_debit: Money,
    pub total_credit: Money,
    /// `total_debit - total_credit`; zero when the books balance.
    pub difference: Money,
    pub is_balanced: bool,
}

impl TrialBalance {
    /// Splits each closing balance into its debit or credit column.
    /// Rows are ordered by account code.
    pub fn from_balances(as_of: NaiveDate, balances: Vec<AccountBalance>, include_zero: bool) -> Self {
        let mut rows: Vec<TrialBalanceRow> = balances
            .into_iter()
            .filter_map(|b| {
                let closing = b.closing();
                if closing.is_zero() && !include_zero {
                    return None;
                }
                let (debit, credit) = closing.split_balance();
                Some(TrialBalanceRow {
                    account_id: b.account_id,
                    code: b.code,
                    name: b.name,
                    account_type: b.account_type,
                    debit,
                    credit,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code));

        let total_debit: Money = rows.iter().map(|r| r.debit).sum();
        let total_credit: Money = rows.iter().map(|r| r.credit).sum();
        let difference = total_debit - total_credit;

        TrialBalance {
            as_of,
            rows,
            total_debit,
            total_credit,
            difference,
            is_balanced: difference.is_zero(),
        }
    }
}

// =============================================================================
// Aging
// =============================================================================

/// Overdue band an open invoice falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AgingBucket {
    /// Not yet due.
    Current,
    Days1To30,
    Days31To60,
    Days61To90,
    Over90,
}

impl AgingBucket {
    /// Bucket for a number of days past the due date.
    pub const fn for_days(days_overdue: i64) -> Self {
        match days_overdue {
            i64::MIN..=0 => AgingBucket::Current,
            1..=30 => AgingBucket::Days1To30,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }
}

/// An invoice with an unpaid balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenInvoice {
    pub invoice_id: String,
    pub invoice_no: String,
    pub party_id: String,
    pub party_name: String,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub credit_days: i64,
    pub net: Money,
    pub paid: Money,
}

impl OpenInvoice {
    pub fn outstanding(&self) -> Money {
        self.net - self.paid
    }

    /// Explicit due date, else invoice date plus the party's credit days.
    pub fn effective_due_date(&self) -> NaiveDate {
        self.due_date
            .unwrap_or_else(|| self.invoice_date + Duration::days(self.credit_days.max(0)))
    }

    pub fn days_overdue(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.effective_due_date()).num_days()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BucketTotals {
    pub current: Money,
    pub days_1_30: Money,
    pub days_31_60: Money,
    pub days_61_90: Money,
    pub over_90: Money,
    pub total: Money,
}

impl BucketTotals {
    pub fn add(&mut self, bucket: AgingBucket, amount: Money) {
        let slot = match bucket {
            AgingBucket::Current => &mut self.current,
            AgingBucket::Days1To30 => &mut self.days_1_30,
            AgingBucket::Days31To60 => &mut self.days_31_60,
            AgingBucket::Days61To90 => &mut self.days_61_90,
            AgingBucket::Over90 => &mut self.over_90,
        };
        *slot += amount;
        self.total += amount;
    }

    fn merge(&mut self, other: &BucketTotals) {
        self.current += other.current;
        self.days_1_30 += other.days_1_30;
        self.days_31_60 += other.days_31_60;
        self.days_61_90 += other.days_61_90;
        self.over_90 += other.over_90;
        self.total += other.total;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AgingRow {
    pub party_id: String,
    pub party_name: String,
    pub invoice_count: u32,
    pub buckets: BucketTotals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AgingReport {
    pub kind: AgingKind,
    #[ts(as = "String")]
    pub as_of: NaiveDate,
    pub rows: Vec<AgingRow>,
    pub totals: BucketTotals,
}

/// Buckets open invoices per party.
///
/// Invoices dated after `as_of` and invoices with nothing outstanding are
/// skipped. Rows are sorted by party name, then id.
pub fn build_aging(kind: AgingKind, as_of: NaiveDate, invoices: Vec<OpenInvoice>) -> AgingReport {
    let mut by_party: BTreeMap<String, AgingRow> = BTreeMap::new();

    for invoice in invoices {
        let outstanding = invoice.outstanding();
        if invoice.invoice_date > as_of || !outstanding.is_positive() {
            continue;
        }
        let bucket = AgingBucket::for_days(invoice.days_overdue(as_of));

        let row = by_party
            .entry(invoice.party_id.clone())
            .or_insert_with(|| AgingRow {
                party_id: invoice.party_id.clone(),
                party_name: invoice.party_name.clone(),
                invoice_count: 0,
                buckets: BucketTotals::default(),
            });
        row.invoice_count += 1;
        row.buckets.add(bucket, outstanding);
    }

    let mut rows: Vec<AgingRow> = by_party.into_values().collect();
    rows.sort_by(|a, b| a.party_name.cmp(&b.party_name).then_with(|| a.party_id.cmp(&b.party_id)));

    let mut totals = BucketTotals::default();
    for row in &rows {
        totals.merge(&row.buckets);
    }

    AgingReport {
        kind,
        as_of,
        rows,
        totals,
    }
}

// =============================================================================
// Sales / Purchase Registers
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RegisterKind {
    Sales,
    Purchases,
}

impl RegisterKind {
    /// Document types listed in this register: the base type and its return.
    pub const fn invoice_types(&self) -> [InvoiceType; 2] {
        match self {
            RegisterKind::Sales => [InvoiceType::Sale, InvoiceType::SaleReturn],
            RegisterKind::Purchases => [InvoiceType::Purchase, InvoiceType::PurchaseReturn],
        }
    }
}

/// An invoice header as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceHeader {
    pub invoice_id: String,
    pub invoice_no: String,
    pub invoice_type: InvoiceType,
    pub date: NaiveDate,
    pub party_name: Option<String>,
    pub gross: Money,
    pub discount: Money,
    pub tax: Money,
    pub net: Money,
    pub paid: Money,
}

/// A register line. Amounts on return documents are negated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegisterLine {
    pub invoice_id: String,
    pub invoice_no: String,
    pub invoice_type: InvoiceType,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub party_name: Option<String>,
    pub gross: Money,
    pub discount: Money,
    pub tax: Money,
    pub net: Money,
    pub paid: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegisterTotals {
    pub invoice_count: u32,
    pub return_count: u32,
    pub gross: Money,
    pub discount: Money,
    pub tax: Money,
    pub net: Money,
    pub paid: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyTotal {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub documents: u32,
    pub net: Money,
    pub paid: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Register {
    pub kind: RegisterKind,
    pub range: DateRange,
    pub lines: Vec<RegisterLine>,
    pub totals: RegisterTotals,
    pub daily: Vec<DailyTotal>,
}

/// Builds a sales or purchase register.
///
/// Headers of other document types or outside `range` are dropped. Lines
/// are ordered by date, then invoice number.
pub fn build_register(kind: RegisterKind, range: DateRange, headers: Vec<InvoiceHeader>) -> Register {
    let allowed = kind.invoice_types();

    let mut lines: Vec<RegisterLine> = headers
        .into_iter()
        .filter(|h| allowed.contains(&h.invoice_type) && range.contains(h.date))
        .map(|h| {
            let sign = if h.invoice_type.is_return() { -1 } else { 1 };
            let net = h.net * sign;
            let paid = h.paid * sign;
            RegisterLine {
                invoice_id: h.invoice_id,
                invoice_no: h.invoice_no,
                invoice_type: h.invoice_type,
                date: h.date,
                party_name: h.party_name,
                gross: h.gross * sign,
                discount: h.discount * sign,
                tax: h.tax * sign,
                net,
                paid,
                balance: net - paid,
            }
        })
        .collect();
    lines.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.invoice_no.cmp(&b.invoice_no)));

    let mut totals = RegisterTotals::default();
    let mut daily: BTreeMap<NaiveDate, DailyTotal> = BTreeMap::new();

    for line in &lines {
        if line.invoice_type.is_return() {
            totals.return_count += 1;
        } else {
            totals.invoice_count += 1;
        }
        totals.gross += line.gross;
        totals.discount += line.discount;
        totals.tax += line.tax;
        totals.net += line.net;
        totals.paid += line.paid;
        totals.balance += line.balance;

        let day = daily.entry(line.date).or_insert_with(|| DailyTotal {
            date: line.date,
            documents: 0,
            net: Money::zero(),
            paid: Money::zero(),
        });
        day.documents += 1;
        day.net += line.net;
        day.paid += line.paid;
    }

    Register {
        kind,
        range,
        lines,
        totals,
        daily: daily.into_values().collect(),
    }
}

// =============================================================================
// Stock Summary
// =============================================================================

/// Quantities per item up to the report date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuantities {
    pub item_id: String,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub cost: Money,
    pub opening_qty: i64,
    pub purchased_qty: i64,
    pub purchase_returned_qty: i64,
    pub sold_qty: i64,
    pub sale_returned_qty: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockLine {
    pub item_id: String,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub opening_qty: i64,
    /// Purchases plus customer returns.
    pub inward_qty: i64,
    /// Sales plus returns to suppliers.
    pub outward_qty: i64,
    pub closing_qty: i64,
    pub cost: Money,
    pub closing_value: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockSummary {
    #[ts(as = "String")]
    pub as_of: NaiveDate,
    pub lines: Vec<StockLine>,
    pub total_value: Money,
}

impl StockSummary {
    pub fn from_rows(as_of: NaiveDate, rows: Vec<ItemQuantities>) -> Self {
        let mut lines: Vec<StockLine> = rows
            .into_iter()
            .map(|r| {
                let inward_qty = r.purchased_qty + r.sale_returned_qty;
                let outward_qty = r.sold_qty + r.purchase_returned_qty;
                let closing_qty = r.opening_qty + inward_qty - outward_qty;
                StockLine {
                    item_id: r.item_id,
                    code: r.code,
                    name: r.name,
                    unit: r.unit,
                    opening_qty: r.opening_qty,
                    inward_qty,
                    outward_qty,
                    closing_qty,
                    cost: r.cost,
                    closing_value: r.cost.multiply_quantity(closing_qty),
                }
            })
            .collect();
        lines.sort_by(|a, b| a.code.cmp(&b.code));

        let total_value = lines.iter().map(|l| l.closing_value).sum();

        StockSummary {
            as_of,
            lines,
            total_value,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    fn movement(d: &str, debit: i64, credit: i64) -> Movement {
        Movement {
            date: date(d),
            reference: None,
            narration: None,
            account: None,
            debit: cents(debit),
            credit: cents(credit),
        }
    }

    fn january() -> DateRange {
        DateRange::new(date("2026-01-01"), date("2026-01-31")).unwrap()
    }

    #[test]
    fn test_ledger_running_balance() {
        let account = AccountRef {
            id: "a1".into(),
            code: "1001".into(),
            name: "Cash in hand".into(),
        };
        let ledger = build_ledger(
            account,
            january(),
            cents(10_000),
            vec![
                movement("2026-01-02", 5_000, 0),
                movement("2026-01-03", 0, 12_000),
                movement("2026-01-05", 1_500, 0),
            ],
        );

        let balances: Vec<i64> = ledger.lines.iter().map(|l| l.balance.cents()).collect();
        assert_eq!(balances, vec![15_000, 3_000, 4_500]);
        assert_eq!(ledger.total_debit, cents(6_500));
        assert_eq!(ledger.total_credit, cents(12_000));
        assert_eq!(ledger.closing_balance, cents(4_500));
        assert_eq!(
            ledger.opening_balance + ledger.total_debit - ledger.total_credit,
            ledger.closing_balance
        );
    }

    #[test]
    fn test_ledger_without_movements_closes_at_opening() {
        let account = AccountRef {
            id: "a1".into(),
            code: "2001".into(),
            name: "Payables".into(),
        };
        let ledger = build_ledger(account, january(), cents(-7_000), Vec::new());
        assert!(ledger.lines.is_empty());
        assert_eq!(ledger.closing_balance, cents(-7_000));
    }

    #[test]
    fn test_cash_book_totals() {
        let book = build_cash_book(
            january(),
            Vec::new(),
            cents(2_000),
            vec![movement("2026-01-10", 3_000, 0), movement("2026-01-11", 0, 4_500)],
        );
        assert_eq!(book.total_receipts, cents(3_000));
        assert_eq!(book.total_payments, cents(4_500));
        assert_eq!(book.closing_balance, cents(500));
    }

    fn balance(code: &str, account_type: AccountType, opening: i64, dr: i64, cr: i64) -> AccountBalance {
        AccountBalance {
            account_id: format!("id-{code}"),
            code: code.to_string(),
            name: format!("Account {code}"),
            account_type,
            opening: cents(opening),
            debits: cents(dr),
            credits: cents(cr),
        }
    }

    #[test]
    fn test_trial_balance_balanced() {
        let tb = TrialBalance::from_balances(
            date("2026-01-31"),
            vec![
                balance("4001", AccountType::Income, 0, 0, 25_000),
                balance("1001", AccountType::Asset, 5_000, 25_000, 8_000),
                balance("3001", AccountType::Equity, -5_000, 0, 0),
                balance("5001", AccountType::Expense, 0, 8_000, 0),
            ],
            false,
        );

        let codes: Vec<&str> = tb.rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["1001", "3001", "4001", "5001"]);
        assert_eq!(tb.rows[0].debit, cents(22_000));
        assert_eq!(tb.rows[1].credit, cents(5_000));
        assert_eq!(tb.total_debit, cents(30_000));
        assert_eq!(tb.total_credit, cents(30_000));
        assert!(tb.is_balanced);
        assert!(tb.difference.is_zero());
    }

    #[test]
    fn test_trial_balance_zero_rows_and_difference() {
        let balances = vec![
            balance("1001", AccountType::Asset, 0, 1_000, 0),
            balance("1002", AccountType::Asset, 0, 500, 500),
        ];

        let tb = TrialBalance::from_balances(date("2026-01-31"), balances.clone(), false);
        assert_eq!(tb.rows.len(), 1);
        assert!(!tb.is_balanced);
        assert_eq!(tb.difference, cents(1_000));

        let with_zero = TrialBalance::from_balances(date("2026-01-31"), balances, true);
        assert_eq!(with_zero.rows.len(), 2);
    }

    #[test]
    fn test_aging_bucket_edges() {
        assert_eq!(AgingBucket::for_days(-10), AgingBucket::Current);
        assert_eq!(AgingBucket::for_days(0), AgingBucket::Current);
        assert_eq!(AgingBucket::for_days(1), AgingBucket::Days1To30);
        assert_eq!(AgingBucket::for_days(30), AgingBucket::Days1To30);
        assert_eq!(AgingBucket::for_days(31), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::for_days(60), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::for_days(61), AgingBucket::Days61To90);
        assert_eq!(AgingBucket::for_days(90), AgingBucket::Days61To90);
        assert_eq!(AgingBucket::for_days(91), AgingBucket::Over90);
    }

    fn open_invoice(no: &str, party: &str, inv_date: &str, credit_days: i64, net: i64, paid: i64) -> OpenInvoice {
        OpenInvoice {
            invoice_id: format!("inv-{no}"),
            invoice_no: no.to_string(),
            party_id: format!("p-{party}"),
            party_name: party.to_string(),
            invoice_date: date(inv_date),
            due_date: None,
            credit_days,
            net: cents(net),
            paid: cents(paid),
        }
    }

    #[test]
    fn test_aging_groups_by_party() {
        let as_of = date("2026-04-30");
        let report = build_aging(
            AgingKind::Receivable,
            as_of,
            vec![
                // due 2026-04-30 → current
                open_invoice("S-1", "Zeta Mart", "2026-04-15", 15, 10_000, 0),
                // due 2026-03-31 → 30 days
                open_invoice("S-2", "Zeta Mart", "2026-03-01", 30, 8_000, 3_000),
                // due 2026-01-15 → 105 days
                open_invoice("S-3", "Alpha Store", "2026-01-15", 0, 4_000, 0),
                // fully paid, skipped
                open_invoice("S-4", "Alpha Store", "2026-02-01", 0, 2_000, 2_000),
                // after as_of, skipped
                open_invoice("S-5", "Alpha Store", "2026-05-02", 0, 9_000, 0),
            ],
        );

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].party_name, "Alpha Store");
        assert_eq!(report.rows[0].invoice_count, 1);
        assert_eq!(report.rows[0].buckets.over_90, cents(4_000));

        let zeta = &report.rows[1];
        assert_eq!(zeta.invoice_count, 2);
        assert_eq!(zeta.buckets.current, cents(10_000));
        assert_eq!(zeta.buckets.days_1_30, cents(5_000));
        assert_eq!(zeta.buckets.total, cents(15_000));

        assert_eq!(report.totals.total, cents(19_000));
        assert_eq!(
            report.totals.current
                + report.totals.days_1_30
                + report.totals.days_31_60
                + report.totals.days_61_90
                + report.totals.over_90,
            report.totals.total
        );
    }

    #[test]
    fn test_aging_explicit_due_date_wins() {
        let mut invoice = open_invoice("P-1", "Supplier", "2026-01-01", 90, 1_000, 0);
        invoice.due_date = Some(date("2026-01-11"));
        assert_eq!(invoice.days_overdue(date("2026-01-31")), 20);
    }

    fn header(no: &str, invoice_type: InvoiceType, d: &str, net: i64, paid: i64) -> InvoiceHeader {
        InvoiceHeader {
            invoice_id: format!("id-{no}"),
            invoice_no: no.to_string(),
            invoice_type,
            date: date(d),
            party_name: None,
            gross: cents(net),
            discount: Money::zero(),
            tax: Money::zero(),
            net: cents(net),
            paid: cents(paid),
        }
    }

    #[test]
    fn test_sales_register_negates_returns() {
        let register = build_register(
            RegisterKind::Sales,
            january(),
            vec![
                header("S-2", InvoiceType::Sale, "2026-01-05", 3_000, 3_000),
                header("S-1", InvoiceType::Sale, "2026-01-05", 5_000, 2_000),
                header("SR-1", InvoiceType::SaleReturn, "2026-01-06", 1_000, 1_000),
                header("P-1", InvoiceType::Purchase, "2026-01-06", 9_999, 0),
                header("S-9", InvoiceType::Sale, "2026-02-01", 7_000, 0),
            ],
        );

        let numbers: Vec<&str> = register.lines.iter().map(|l| l.invoice_no.as_str()).collect();
        assert_eq!(numbers, vec!["S-1", "S-2", "SR-1"]);
        assert_eq!(register.lines[2].net, cents(-1_000));

        assert_eq!(register.totals.invoice_count, 2);
        assert_eq!(register.totals.return_count, 1);
        assert_eq!(register.totals.net, cents(7_000));
        assert_eq!(register.totals.paid, cents(4_000));
        assert_eq!(register.totals.balance, cents(3_000));

        assert_eq!(register.daily.len(), 2);
        assert_eq!(register.daily[0].documents, 2);
        assert_eq!(register.daily[0].net, cents(8_000));
        assert_eq!(register.daily[1].net, cents(-1_000));
    }

    #[test]
    fn test_stock_summary() {
        let summary = StockSummary::from_rows(
            date("2026-01-31"),
            vec![
                ItemQuantities {
                    item_id: "i2".into(),
                    code: "RICE-5".into(),
                    name: "Rice 5kg".into(),
                    unit: "bag".into(),
                    cost: cents(1_500),
                    opening_qty: 10,
                    purchased_qty: 20,
                    purchase_returned_qty: 2,
                    sold_qty: 15,
                    sale_returned_qty: 1,
                },
                ItemQuantities {
                    item_id: "i1".into(),
                    code: "OIL-1".into(),
                    name: "Cooking Oil 1L".into(),
                    unit: "btl".into(),
                    cost: cents(450),
                    opening_qty: 0,
                    purchased_qty: 0,
                    purchase_returned_qty: 0,
                    sold_qty: 0,
                    sale_returned_qty: 0,
                },
            ],
        );

        assert_eq!(summary.lines[0].code, "OIL-1");
        let rice = &summary.lines[1];
        assert_eq!(rice.inward_qty, 21);
        assert_eq!(rice.outward_qty, 17);
        assert_eq!(rice.closing_qty, 14);
        assert_eq!(rice.closing_value, cents(21_000));
        assert_eq!(summary.total_value, cents(21_000));
    }
}
