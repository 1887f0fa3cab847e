//! # Report Repository
//!
//! Aggregation queries over a tenant database. Each method fetches rows with
//! portable SQL and hands them to `posreport_core::report` for assembly.
//!
//! ## Query Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Report          SQL                                   Core builder     │
//! │  ──────          ───                                   ────────────     │
//! │  cash_book       cash accounts + entries in range      build_cash_book  │
//! │  ledger          one account + entries in range        build_ledger     │
//! │  trial_balance   accounts LEFT JOIN entries ≤ as_of    TrialBalance     │
//! │  aging           open invoices JOIN parties            build_aging      │
//! │  *_register      invoice headers in range              build_register   │
//! │  stock_summary   items LEFT JOIN lines/invoices        StockSummary     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Portability
//! Dates are ISO text, so `<` / `>=` compare chronologically on both
//! engines. Sums are cast back to BIGINT because PostgreSQL widens
//! `SUM(bigint)` to NUMERIC.

use chrono::NaiveDate;
use sqlx::AnyPool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::date_text;
use posreport_core::report::{
    build_aging, build_cash_book, build_ledger, build_register, AccountBalance, AccountRef,
    AgingReport, CashBook, InvoiceHeader, ItemQuantities, LedgerReport, Movement, OpenInvoice,
    Register, RegisterKind, StockSummary, TrialBalance,
};
use posreport_core::{parse_date, AgingKind, DateRange, Money};

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AccountHeadRow {
    id: String,
    code: String,
    name: String,
    opening_balance_cents: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct MovementRow {
    entry_date: String,
    reference: Option<String>,
    narration: Option<String>,
    account_name: String,
    debit_cents: i64,
    credit_cents: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct BalanceRow {
    id: String,
    code: String,
    name: String,
    account_type: String,
    opening_balance_cents: i64,
    debits: i64,
    credits: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OpenInvoiceRow {
    id: String,
    invoice_no: String,
    party_id: String,
    party_name: String,
    invoice_date: String,
    due_date: Option<String>,
    credit_days: i64,
    net_cents: i64,
    paid_cents: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct HeaderRow {
    id: String,
    invoice_no: String,
    invoice_type: String,
    invoice_date: String,
    party_name: Option<String>,
    gross_cents: i64,
    discount_cents: i64,
    tax_cents: i64,
    net_cents: i64,
    paid_cents: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct QuantityRow {
    id: String,
    code: String,
    name: String,
    unit: String,
    cost_cents: i64,
    opening_qty: i64,
    purchased_qty: i64,
    purchase_returned_qty: i64,
    sold_qty: i64,
    sale_returned_qty: i64,
}

/// Which ledger entries a movement query covers.
enum MovementScope<'a> {
    CashAccounts,
    Account(&'a str),
}

const MOVEMENT_SELECT: &str = r#"
    SELECT e.entry_date,
           COALESCE(v.voucher_no, i.invoice_no) AS reference,
           e.narration,
           a.name AS account_name,
           e.debit_cents,
           e.credit_cents
    FROM ledger_entries e
    JOIN accounts a ON a.id = e.account_id
    LEFT JOIN vouchers v ON v.id = e.voucher_id
    LEFT JOIN invoices i ON i.id = e.invoice_id
"#;

// =============================================================================
// Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: AnyPool,
}

impl ReportRepository {
    pub fn new(pool: AnyPool) -> Self {
        ReportRepository { pool }
    }

    /// Cash book across every `is_cash` account.
    pub async fn cash_book(&self, range: DateRange) -> DbResult<CashBook> {
        debug!(from = %range.from, to = %range.to, "Building cash book");

        let heads: Vec<AccountHeadRow> = sqlx::query_as(
            "SELECT id, code, name, opening_balance_cents FROM accounts WHERE is_cash = 1 ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;

        let opening_balances: Money = heads
            .iter()
            .map(|h| Money::from_cents(h.opening_balance_cents))
            .sum();

        let prior: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(CAST(SUM(e.debit_cents - e.credit_cents) AS BIGINT), 0)
            FROM ledger_entries e
            JOIN accounts a ON a.id = e.account_id
            WHERE a.is_cash = 1 AND e.entry_date < $1
            "#,
        )
        .bind(date_text(range.from))
        .fetch_one(&self.pool)
        .await?;

        let movements = self.movements(MovementScope::CashAccounts, range).await?;

        let accounts = heads
            .into_iter()
            .map(|h| AccountRef {
                id: h.id,
                code: h.code,
                name: h.name,
            })
            .collect();

        Ok(build_cash_book(
            range,
            accounts,
            opening_balances + Money::from_cents(prior),
            movements,
        ))
    }

    /// Ledger of one account.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] when the account doesn't exist
    pub async fn ledger(&self, account_id: &str, range: DateRange) -> DbResult<LedgerReport> {
        debug!(account_id = %account_id, from = %range.from, to = %range.to, "Building ledger");

        let head: AccountHeadRow = sqlx::query_as(
            "SELECT id, code, name, opening_balance_cents FROM accounts WHERE id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Account", account_id))?;

        let prior: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(CAST(SUM(debit_cents - credit_cents) AS BIGINT), 0)
            FROM ledger_entries
            WHERE account_id = $1 AND entry_date < $2
            "#,
        )
        .bind(account_id)
        .bind(date_text(range.from))
        .fetch_one(&self.pool)
        .await?;

        let movements = self
            .movements(MovementScope::Account(account_id), range)
            .await?
            .into_iter()
            .map(|m| Movement { account: None, ..m })
            .collect();

        let opening = Money::from_cents(head.opening_balance_cents + prior);
        let account = AccountRef {
            id: head.id,
            code: head.code,
            name: head.name,
        };

        Ok(build_ledger(account, range, opening, movements))
    }

    /// Trial balance as of a date (inclusive).
    pub async fn trial_balance(&self, as_of: NaiveDate, include_zero: bool) -> DbResult<TrialBalance> {
        debug!(as_of = %as_of, include_zero, "Building trial balance");

        let rows: Vec<BalanceRow> = sqlx::query_as(
            r#"
            SELECT a.id, a.code, a.name, a.account_type, a.opening_balance_cents,
                   COALESCE(CAST(SUM(e.debit_cents) AS BIGINT), 0) AS debits,
                   COALESCE(CAST(SUM(e.credit_cents) AS BIGINT), 0) AS credits
            FROM accounts a
            LEFT JOIN ledger_entries e ON e.account_id = a.id AND e.entry_date <= $1
            GROUP BY a.id, a.code, a.name, a.account_type, a.opening_balance_cents
            ORDER BY a.code
            "#,
        )
        .bind(date_text(as_of))
        .fetch_all(&self.pool)
        .await?;

        let balances = rows
            .into_iter()
            .map(|r| {
                Ok(AccountBalance {
                    account_id: r.id,
                    code: r.code,
                    name: r.name,
                    account_type: r.account_type.parse()?,
                    opening: Money::from_cents(r.opening_balance_cents),
                    debits: Money::from_cents(r.debits),
                    credits: Money::from_cents(r.credits),
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(TrialBalance::from_balances(as_of, balances, include_zero))
    }

    /// Receivable (sale) or payable (purchase) aging as of a date.
    pub async fn aging(&self, kind: AgingKind, as_of: NaiveDate) -> DbResult<AgingReport> {
        debug!(kind = %kind, as_of = %as_of, "Building aging report");

        let rows: Vec<OpenInvoiceRow> = sqlx::query_as(
            r#"
            SELECT i.id, i.invoice_no, i.party_id, p.name AS party_name,
                   i.invoice_date, i.due_date, p.credit_days, i.net_cents, i.paid_cents
            FROM invoices i
            JOIN parties p ON p.id = i.party_id
            WHERE i.invoice_type = $1
              AND i.invoice_date <= $2
              AND i.net_cents > i.paid_cents
            ORDER BY i.invoice_date, i.invoice_no
            "#,
        )
        .bind(kind.invoice_type().as_str())
        .bind(date_text(as_of))
        .fetch_all(&self.pool)
        .await?;

        let invoices = rows
            .into_iter()
            .map(|r| {
                Ok(OpenInvoice {
                    invoice_id: r.id,
                    invoice_no: r.invoice_no,
                    party_id: r.party_id,
                    party_name: r.party_name,
                    invoice_date: parse_date("invoice_date", &r.invoice_date)?,
                    due_date: r
                        .due_date
                        .as_deref()
                        .map(|d| parse_date("due_date", d))
                        .transpose()?,
                    credit_days: r.credit_days,
                    net: Money::from_cents(r.net_cents),
                    paid: Money::from_cents(r.paid_cents),
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(build_aging(kind, as_of, invoices))
    }

    /// Sale invoices and sale returns in a range, optionally for one party.
    pub async fn sales_register(&self, range: DateRange, party_id: Option<&str>) -> DbResult<Register> {
        self.register(RegisterKind::Sales, range, party_id).await
    }

    /// Purchase invoices and purchase returns in a range, optionally for one party.
    pub async fn purchase_register(
        &self,
        range: DateRange,
        party_id: Option<&str>,
    ) -> DbResult<Register> {
        self.register(RegisterKind::Purchases, range, party_id).await
    }

    /// Quantities and value on hand as of a date (inclusive).
    pub async fn stock_summary(&self, as_of: NaiveDate) -> DbResult<StockSummary> {
        debug!(as_of = %as_of, "Building stock summary");

        let rows: Vec<QuantityRow> = sqlx::query_as(
            r#"
            SELECT it.id, it.code, it.name, it.unit, it.cost_cents, it.opening_qty,
                   COALESCE(CAST(SUM(CASE WHEN i.invoice_type = 'purchase' THEN l.quantity ELSE 0 END) AS BIGINT), 0)
                       AS purchased_qty,
                   COALESCE(CAST(SUM(CASE WHEN i.invoice_type = 'purchase_return' THEN l.quantity ELSE 0 END) AS BIGINT), 0)
                       AS purchase_returned_qty,
                   COALESCE(CAST(SUM(CASE WHEN i.invoice_type = 'sale' THEN l.quantity ELSE 0 END) AS BIGINT), 0)
                       AS sold_qty,
                   COALESCE(CAST(SUM(CASE WHEN i.invoice_type = 'sale_return' THEN l.quantity ELSE 0 END) AS BIGINT), 0)
                       AS sale_returned_qty
            FROM items it
            LEFT JOIN invoice_lines l ON l.item_id = it.id
            LEFT JOIN invoices i ON i.id = l.invoice_id AND i.invoice_date <= $1
            GROUP BY it.id, it.code, it.name, it.unit, it.cost_cents, it.opening_qty
            ORDER BY it.code
            "#,
        )
        .bind(date_text(as_of))
        .fetch_all(&self.pool)
        .await?;

        let quantities = rows
            .into_iter()
            .map(|r| ItemQuantities {
                item_id: r.id,
                code: r.code,
                name: r.name,
                unit: r.unit,
                cost: Money::from_cents(r.cost_cents),
                opening_qty: r.opening_qty,
                purchased_qty: r.purchased_qty,
                purchase_returned_qty: r.purchase_returned_qty,
                sold_qty: r.sold_qty,
                sale_returned_qty: r.sale_returned_qty,
            })
            .collect();

        Ok(StockSummary::from_rows(as_of, quantities))
    }

    // =========================================================================
    // Shared Queries
    // =========================================================================

    async fn movements(&self, scope: MovementScope<'_>, range: DateRange) -> DbResult<Vec<Movement>> {
        let order = "ORDER BY e.entry_date, reference, e.id";

        let rows: Vec<MovementRow> = match scope {
            MovementScope::CashAccounts => {
                sqlx::query_as(&format!(
                    "{MOVEMENT_SELECT} WHERE a.is_cash = 1 AND e.entry_date >= $1 AND e.entry_date <= $2 {order}"
                ))
                .bind(date_text(range.from))
                .bind(date_text(range.to))
                .fetch_all(&self.pool)
                .await?
            }
            MovementScope::Account(account_id) => {
                sqlx::query_as(&format!(
                    "{MOVEMENT_SELECT} WHERE e.account_id = $1 AND e.entry_date >= $2 AND e.entry_date <= $3 {order}"
                ))
                .bind(account_id)
                .bind(date_text(range.from))
                .bind(date_text(range.to))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter()
            .map(|r| {
                Ok(Movement {
                    date: parse_date("entry_date", &r.entry_date)?,
                    reference: r.reference,
                    narration: r.narration,
                    account: Some(r.account_name),
                    debit: Money::from_cents(r.debit_cents),
                    credit: Money::from_cents(r.credit_cents),
                })
            })
            .collect()
    }

    async fn register(
        &self,
        kind: RegisterKind,
        range: DateRange,
        party_id: Option<&str>,
    ) -> DbResult<Register> {
        debug!(kind = ?kind, from = %range.from, to = %range.to, "Building register");

        let [base, returns] = kind.invoice_types();
        let mut sql = String::from(
            r#"
            SELECT i.id, i.invoice_no, i.invoice_type, i.invoice_date, p.name AS party_name,
                   i.gross_cents, i.discount_cents, i.tax_cents, i.net_cents, i.paid_cents
            FROM invoices i
            LEFT JOIN parties p ON p.id = i.party_id
            WHERE i.invoice_type IN ($1, $2)
              AND i.invoice_date >= $3
              AND i.invoice_date <= $4
            "#,
        );
        if party_id.is_some() {
            sql.push_str(" AND i.party_id = $5");
        }
        sql.push_str(" ORDER BY i.invoice_date, i.invoice_no");

        let mut query = sqlx::query_as::<_, HeaderRow>(&sql)
            .bind(base.as_str())
            .bind(returns.as_str())
            .bind(date_text(range.from))
            .bind(date_text(range.to));
        if let Some(party_id) = party_id {
            query = query.bind(party_id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let headers = rows
            .into_iter()
            .map(|r| {
                Ok(InvoiceHeader {
                    invoice_id: r.id,
                    invoice_no: r.invoice_no,
                    invoice_type: r.invoice_type.parse()?,
                    date: parse_date("invoice_date", &r.invoice_date)?,
                    party_name: r.party_name,
                    gross: Money::from_cents(r.gross_cents),
                    discount: Money::from_cents(r.discount_cents),
                    tax: Money::from_cents(r.tax_cents),
                    net: Money::from_cents(r.net_cents),
                    paid: Money::from_cents(r.paid_cents),
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(build_register(kind, range, headers))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::catalog::tests::{account, date, item, tenant_db};
    use crate::repository::catalog::{
        NewInvoice, NewInvoiceLine, NewLedgerEntry, NewVoucher, NewVoucherEntry,
    };
    use crate::TenantDb;
    use posreport_core::report::AgingBucket;
    use posreport_core::{AccountType, InvoiceType, Party, PartyType, VoucherType};

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    fn january() -> DateRange {
        DateRange::new(date("2026-01-01"), date("2026-01-31")).unwrap()
    }

    /// Cash 1001 (opening 10_000), bank 1002, receivables 1100, sales 4001,
    /// rent 5001; one customer, two items; a sale, a return, and vouchers.
    async fn seeded() -> (tempfile::TempDir, TenantDb) {
        let (dir, db) = tenant_db().await;
        let catalog = db.catalog();

        catalog.insert_account(&account("1001", AccountType::Asset, true, 10_000)).await.unwrap();
        catalog.insert_account(&account("1002", AccountType::Asset, false, 0)).await.unwrap();
        catalog.insert_account(&account("1100", AccountType::Asset, false, 0)).await.unwrap();
        catalog.insert_account(&account("3001", AccountType::Equity, false, -10_000)).await.unwrap();
        catalog.insert_account(&account("4001", AccountType::Income, false, 0)).await.unwrap();
        catalog.insert_account(&account("5001", AccountType::Expense, false, 0)).await.unwrap();

        catalog
            .insert_party(&Party {
                id: "cust-1".to_string(),
                code: "C001".to_string(),
                name: "Hamid General Store".to_string(),
                party_type: PartyType::Customer,
                account_id: "acc-1100".to_string(),
                phone: Some("0300-1234567".to_string()),
                credit_days: 15,
            })
            .await
            .unwrap();

        catalog.insert_item(&item("OIL", 400, 10)).await.unwrap();
        catalog.insert_item(&item("SUGAR", 150, 0)).await.unwrap();

        let sale = NewInvoice {
            invoice_no: "S-0001".to_string(),
            invoice_type: InvoiceType::Sale,
            invoice_date: date("2025-12-20"),
            due_date: None,
            party_id: Some("cust-1".to_string()),
            discount: Money::zero(),
            tax: Money::zero(),
            paid: cents(1_000),
            lines: vec![NewInvoiceLine {
                item_id: "item-OIL".to_string(),
                quantity: 4,
                rate: cents(800),
            }],
        };
        let sale_id = catalog.insert_invoice(&sale).await.unwrap();
        for (account_id, debit, credit) in [("acc-1100", 3_200, 0), ("acc-4001", 0, 3_200)] {
            catalog
                .post_entry(&NewLedgerEntry {
                    entry_date: date("2025-12-20"),
                    account_id: account_id.to_string(),
                    voucher_id: None,
                    invoice_id: Some(sale_id.clone()),
                    debit: cents(debit),
                    credit: cents(credit),
                    narration: None,
                })
                .await
                .unwrap();
        }

        catalog
            .insert_invoice(&NewInvoice {
                invoice_no: "SR-0001".to_string(),
                invoice_type: InvoiceType::SaleReturn,
                invoice_date: date("2026-01-03"),
                due_date: None,
                party_id: Some("cust-1".to_string()),
                discount: Money::zero(),
                tax: Money::zero(),
                paid: Money::zero(),
                lines: vec![NewInvoiceLine {
                    item_id: "item-OIL".to_string(),
                    quantity: 1,
                    rate: cents(800),
                }],
            })
            .await
            .unwrap();

        // Receipt before the period, rent paid inside it
        catalog
            .insert_voucher(&NewVoucher {
                voucher_no: "CR-0001".to_string(),
                voucher_type: VoucherType::CashReceipt,
                voucher_date: date("2025-12-28"),
                narration: Some("Part payment".to_string()),
                entries: vec![
                    NewVoucherEntry {
                        account_id: "acc-1001".to_string(),
                        debit: cents(1_000),
                        credit: Money::zero(),
                        narration: None,
                    },
                    NewVoucherEntry {
                        account_id: "acc-1100".to_string(),
                        debit: Money::zero(),
                        credit: cents(1_000),
                        narration: None,
                    },
                ],
            })
            .await
            .unwrap();

        catalog
            .insert_voucher(&NewVoucher {
                voucher_no: "CP-0001".to_string(),
                voucher_type: VoucherType::CashPayment,
                voucher_date: date("2026-01-05"),
                narration: Some("Shop rent".to_string()),
                entries: vec![
                    NewVoucherEntry {
                        account_id: "acc-5001".to_string(),
                        debit: cents(2_500),
                        credit: Money::zero(),
                        narration: None,
                    },
                    NewVoucherEntry {
                        account_id: "acc-1001".to_string(),
                        debit: Money::zero(),
                        credit: cents(2_500),
                        narration: None,
                    },
                ],
            })
            .await
            .unwrap();

        (dir, db)
    }

    #[tokio::test]
    async fn test_cash_book() {
        let (_dir, db) = seeded().await;
        let book = db.reports().cash_book(january()).await.unwrap();

        assert_eq!(book.accounts.len(), 1);
        // 10_000 opening + 1_000 December receipt
        assert_eq!(book.opening_balance, cents(11_000));
        assert_eq!(book.lines.len(), 1);
        assert_eq!(book.lines[0].reference.as_deref(), Some("CP-0001"));
        assert_eq!(book.lines[0].narration.as_deref(), Some("Shop rent"));
        assert_eq!(book.total_payments, cents(2_500));
        assert_eq!(book.closing_balance, cents(8_500));
    }

    #[tokio::test]
    async fn test_ledger() {
        let (_dir, db) = seeded().await;
        let range = DateRange::new(date("2025-12-01"), date("2026-01-31")).unwrap();
        let ledger = db.reports().ledger("acc-1100", range).await.unwrap();

        assert!(ledger.opening_balance.is_zero());
        let refs: Vec<Option<&str>> = ledger.lines.iter().map(|l| l.reference.as_deref()).collect();
        assert_eq!(refs, vec![Some("S-0001"), Some("CR-0001")]);
        assert_eq!(ledger.closing_balance, cents(2_200));
        assert!(ledger.lines.iter().all(|l| l.account.is_none()));

        assert!(matches!(
            db.reports().ledger("missing", range).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_trial_balance_balances() {
        let (_dir, db) = seeded().await;
        let tb = db.reports().trial_balance(date("2026-01-31"), false).await.unwrap();

        assert!(tb.is_balanced, "difference: {}", tb.difference);
        assert_eq!(tb.total_debit, cents(13_200));
        // bank account has no balance
        assert!(tb.rows.iter().all(|r| r.code != "1002"));

        let with_zero = db.reports().trial_balance(date("2026-01-31"), true).await.unwrap();
        assert_eq!(with_zero.rows.len(), 6);

        // Before the sale only the opening balances exist
        let early = db.reports().trial_balance(date("2025-12-01"), false).await.unwrap();
        assert_eq!(early.total_debit, cents(10_000));
        assert!(early.is_balanced);
    }

    #[tokio::test]
    async fn test_aging() {
        let (_dir, db) = seeded().await;
        let report = db
            .reports()
            .aging(posreport_core::AgingKind::Receivable, date("2026-01-31"))
            .await
            .unwrap();

        // Due 2026-01-04, 27 days overdue, 2_200 outstanding
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].buckets.days_1_30, cents(2_200));
        assert_eq!(report.totals.total, cents(2_200));
        assert_eq!(AgingBucket::for_days(27), AgingBucket::Days1To30);

        let payable = db
            .reports()
            .aging(posreport_core::AgingKind::Payable, date("2026-01-31"))
            .await
            .unwrap();
        assert!(payable.rows.is_empty());
    }

    #[tokio::test]
    async fn test_sales_register_filters() {
        let (_dir, db) = seeded().await;
        let range = DateRange::new(date("2025-12-01"), date("2026-01-31")).unwrap();

        let register = db.reports().sales_register(range, None).await.unwrap();
        assert_eq!(register.lines.len(), 2);
        assert_eq!(register.totals.net, cents(2_400));
        assert_eq!(register.totals.return_count, 1);

        let for_party = db.reports().sales_register(range, Some("cust-1")).await.unwrap();
        assert_eq!(for_party.lines.len(), 2);
        let nobody = db.reports().sales_register(range, Some("cust-x")).await.unwrap();
        assert!(nobody.lines.is_empty());

        let purchases = db.reports().purchase_register(range, None).await.unwrap();
        assert!(purchases.lines.is_empty());
    }

    #[tokio::test]
    async fn test_stock_summary_respects_date() {
        let (_dir, db) = seeded().await;

        let summary = db.reports().stock_summary(date("2026-01-31")).await.unwrap();
        let oil = &summary.lines[0];
        assert_eq!(oil.code, "OIL");
        assert_eq!(oil.outward_qty, 4);
        assert_eq!(oil.inward_qty, 1);
        assert_eq!(oil.closing_qty, 7);
        assert_eq!(summary.total_value, cents(2_800));

        let before_return = db.reports().stock_summary(date("2025-12-31")).await.unwrap();
        assert_eq!(before_return.lines[0].closing_qty, 6);
        assert_eq!(before_return.lines[1].closing_qty, 0);
    }
}
