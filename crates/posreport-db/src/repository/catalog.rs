//! # Catalog Repository
//!
//! Tenant master data (chart of accounts, parties, items) and the document
//! writers used by seeding and tests.
//!
//! ## Posting Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert_invoice   invoices + invoice_lines        (one transaction)    │
//! │  insert_voucher   vouchers + ledger_entries       (one transaction,    │
//! │                                                    Dr total = Cr total)│
//! │  post_entry       a single ledger_entries row (invoice postings)       │
//! │                                                                         │
//! │  Reports read ledger_entries for balances and invoices for registers,  │
//! │  aging and stock movement.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::AnyPool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{date_text, flag};
use posreport_core::{Account, InvoiceType, Item, Money, Party, PartyType, VoucherType};

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: String,
    code: String,
    name: String,
    account_type: String,
    is_cash: i64,
    opening_balance_cents: i64,
    is_active: i64,
}

impl TryFrom<AccountRow> for Account {
    type Error = DbError;

    fn try_from(row: AccountRow) -> DbResult<Self> {
        Ok(Account {
            id: row.id,
            code: row.code,
            name: row.name,
            account_type: row.account_type.parse()?,
            is_cash: row.is_cash != 0,
            opening_balance: Money::from_cents(row.opening_balance_cents),
            is_active: row.is_active != 0,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PartyRow {
    id: String,
    code: String,
    name: String,
    party_type: String,
    account_id: String,
    phone: Option<String>,
    credit_days: i64,
}

impl TryFrom<PartyRow> for Party {
    type Error = DbError;

    fn try_from(row: PartyRow) -> DbResult<Self> {
        Ok(Party {
            id: row.id,
            code: row.code,
            name: row.name,
            party_type: row.party_type.parse()?,
            account_id: row.account_id,
            phone: row.phone,
            credit_days: row.credit_days,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: String,
    code: String,
    name: String,
    unit: String,
    cost_cents: i64,
    price_cents: i64,
    opening_qty: i64,
    is_active: i64,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            code: row.code,
            name: row.name,
            unit: row.unit,
            cost: Money::from_cents(row.cost_cents),
            price: Money::from_cents(row.price_cents),
            opening_qty: row.opening_qty,
            is_active: row.is_active != 0,
        }
    }
}

// =============================================================================
// Writer Inputs
// =============================================================================

#[derive(Debug, Clone)]
pub struct NewInvoiceLine {
    pub item_id: String,
    pub quantity: i64,
    pub rate: Money,
}

impl NewInvoiceLine {
    pub fn amount(&self) -> Money {
        self.rate.multiply_quantity(self.quantity)
    }
}

/// A trading document. Gross is the sum of line amounts;
/// net = gross - discount + tax.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub invoice_no: String,
    pub invoice_type: InvoiceType,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    /// `None` for walk-in sales.
    pub party_id: Option<String>,
    pub discount: Money,
    pub tax: Money,
    pub paid: Money,
    pub lines: Vec<NewInvoiceLine>,
}

impl NewInvoice {
    pub fn gross(&self) -> Money {
        self.lines.iter().map(NewInvoiceLine::amount).sum()
    }

    pub fn net(&self) -> Money {
        self.gross() - self.discount + self.tax
    }
}

#[derive(Debug, Clone)]
pub struct NewVoucherEntry {
    pub account_id: String,
    pub debit: Money,
    pub credit: Money,
    pub narration: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewVoucher {
    pub voucher_no: String,
    pub voucher_type: VoucherType,
    pub voucher_date: NaiveDate,
    pub narration: Option<String>,
    pub entries: Vec<NewVoucherEntry>,
}

/// A single posting outside a voucher (invoice postings).
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub entry_date: NaiveDate,
    pub account_id: String,
    pub voucher_id: Option<String>,
    pub invoice_id: Option<String>,
    pub debit: Money,
    pub credit: Money,
    pub narration: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: AnyPool,
}

impl CatalogRepository {
    pub fn new(pool: AnyPool) -> Self {
        CatalogRepository { pool }
    }

    /// Chart of accounts ordered by code.
    pub async fn accounts(&self) -> DbResult<Vec<Account>> {
        let rows: Vec<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, code, name, account_type, is_cash, opening_balance_cents, is_active
            FROM accounts
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Account::try_from).collect()
    }

    pub async fn get_account(&self, id: &str) -> DbResult<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, code, name, account_type, is_cash, opening_balance_cents, is_active
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    /// Customers and/or suppliers ordered by name.
    pub async fn parties(&self, party_type: Option<PartyType>) -> DbResult<Vec<Party>> {
        let select = "SELECT id, code, name, party_type, account_id, phone, credit_days FROM parties";

        let rows: Vec<PartyRow> = match party_type {
            Some(kind) => {
                sqlx::query_as(&format!("{select} WHERE party_type = $1 ORDER BY name, code"))
                    .bind(kind.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as(&format!("{select} ORDER BY name, code"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(Party::try_from).collect()
    }

    /// Items ordered by code.
    pub async fn items(&self) -> DbResult<Vec<Item>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, code, name, unit, cost_cents, price_cents, opening_qty, is_active
            FROM items
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    // =========================================================================
    // Writers
    // =========================================================================

    pub async fn insert_account(&self, account: &Account) -> DbResult<()> {
        debug!(code = %account.code, "Inserting account");

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, code, name, account_type, is_cash, opening_balance_cents, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&account.id)
        .bind(&account.code)
        .bind(&account.name)
        .bind(account.account_type.as_str())
        .bind(flag(account.is_cash))
        .bind(account.opening_balance.cents())
        .bind(flag(account.is_active))
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("account code", &account.code),
            other => other,
        })?;

        Ok(())
    }

    pub async fn insert_party(&self, party: &Party) -> DbResult<()> {
        debug!(code = %party.code, "Inserting party");

        sqlx::query(
            r#"
            INSERT INTO parties (id, code, name, party_type, account_id, phone, credit_days)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&party.id)
        .bind(&party.code)
        .bind(&party.name)
        .bind(party.party_type.as_str())
        .bind(&party.account_id)
        .bind(&party.phone)
        .bind(party.credit_days)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("party code", &party.code),
            other => other,
        })?;

        Ok(())
    }

    pub async fn insert_item(&self, item: &Item) -> DbResult<()> {
        debug!(code = %item.code, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (
                id, code, name, unit, cost_cents, price_cents, opening_qty, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.code)
        .bind(&item.name)
        .bind(&item.unit)
        .bind(item.cost.cents())
        .bind(item.price.cents())
        .bind(item.opening_qty)
        .bind(flag(item.is_active))
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("item code", &item.code),
            other => other,
        })?;

        Ok(())
    }

    /// Writes an invoice header and its lines atomically. Returns the new id.
    pub async fn insert_invoice(&self, invoice: &NewInvoice) -> DbResult<String> {
        if invoice.lines.is_empty() {
            return Err(DbError::InvalidData(format!(
                "invoice {} has no lines",
                invoice.invoice_no
            )));
        }
        if invoice.lines.iter().any(|l| l.quantity <= 0) {
            return Err(DbError::InvalidData(format!(
                "invoice {} has a non-positive quantity",
                invoice.invoice_no
            )));
        }

        let id = Uuid::new_v4().to_string();
        let gross = invoice.gross();
        let net = invoice.net();

        debug!(id = %id, invoice_no = %invoice.invoice_no, kind = %invoice.invoice_type, "Inserting invoice");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_no, invoice_type, invoice_date, due_date, party_id,
                gross_cents, discount_cents, tax_cents, net_cents, paid_cents
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&id)
        .bind(&invoice.invoice_no)
        .bind(invoice.invoice_type.as_str())
        .bind(date_text(invoice.invoice_date))
        .bind(invoice.due_date.map(date_text))
        .bind(&invoice.party_id)
        .bind(gross.cents())
        .bind(invoice.discount.cents())
        .bind(invoice.tax.cents())
        .bind(net.cents())
        .bind(invoice.paid.cents())
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("invoice number", &invoice.invoice_no),
            other => other,
        })?;

        for line in &invoice.lines {
            sqlx::query(
                r#"
                INSERT INTO invoice_lines (id, invoice_id, item_id, quantity, rate_cents, amount_cents)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(&line.item_id)
            .bind(line.quantity)
            .bind(line.rate.cents())
            .bind(line.amount().cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Writes a voucher and its entries atomically. Returns the new id.
    ///
    /// ## Errors
    /// - [`DbError::InvalidData`] when the entries don't balance or are empty
    pub async fn insert_voucher(&self, voucher: &NewVoucher) -> DbResult<String> {
        let debits: Money = voucher.entries.iter().map(|e| e.debit).sum();
        let credits: Money = voucher.entries.iter().map(|e| e.credit).sum();
        if voucher.entries.is_empty() || debits != credits {
            return Err(DbError::InvalidData(format!(
                "voucher {} is unbalanced: debits {debits}, credits {credits}",
                voucher.voucher_no
            )));
        }

        let id = Uuid::new_v4().to_string();
        let date = date_text(voucher.voucher_date);

        debug!(id = %id, voucher_no = %voucher.voucher_no, kind = %voucher.voucher_type, "Inserting voucher");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO vouchers (id, voucher_no, voucher_type, voucher_date, narration)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&id)
        .bind(&voucher.voucher_no)
        .bind(voucher.voucher_type.as_str())
        .bind(&date)
        .bind(&voucher.narration)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("voucher number", &voucher.voucher_no),
            other => other,
        })?;

        for entry in &voucher.entries {
            sqlx::query(
                r#"
                INSERT INTO ledger_entries (
                    id, entry_date, account_id, voucher_id, invoice_id,
                    debit_cents, credit_cents, narration
                ) VALUES ($1, $2, $3, $4, NULL, $5, $6, $7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&date)
            .bind(&entry.account_id)
            .bind(&id)
            .bind(entry.debit.cents())
            .bind(entry.credit.cents())
            .bind(entry.narration.as_ref().or(voucher.narration.as_ref()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Writes a single ledger posting. Returns the new id.
    pub async fn post_entry(&self, entry: &NewLedgerEntry) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO ledger_entries (
                id, entry_date, account_id, voucher_id, invoice_id,
                debit_cents, credit_cents, narration
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&id)
        .bind(date_text(entry.entry_date))
        .bind(&entry.account_id)
        .bind(&entry.voucher_id)
        .bind(&entry.invoice_id)
        .bind(entry.debit.cents())
        .bind(entry.credit.cents())
        .bind(&entry.narration)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{TenantDb, TenantPoolConfig, TenantPools};
    use chrono::Utc;
    use posreport_core::{AccountType, DbProvider, Tenant};
    use tempfile::TempDir;

    /// Opens a migrated SQLite tenant database in a temp directory.
    pub(crate) async fn tenant_db() -> (TempDir, TenantDb) {
        let dir = tempfile::tempdir().unwrap();
        let pools = TenantPools::new(TenantPoolConfig::new(dir.path()));
        let now = Utc::now();
        let tenant = Tenant {
            id: "t1".to_string(),
            code: "TEST".to_string(),
            name: "Test Traders".to_string(),
            db_provider: DbProvider::Sqlite,
            connection_string: "tenant.db".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        pools.initialize(&tenant).await.unwrap();
        let db = pools.get(&tenant).await.unwrap();
        (dir, db)
    }

    pub(crate) fn account(code: &str, account_type: AccountType, is_cash: bool, opening: i64) -> Account {
        Account {
            id: format!("acc-{code}"),
            code: code.to_string(),
            name: format!("Account {code}"),
            account_type,
            is_cash,
            opening_balance: Money::from_cents(opening),
            is_active: true,
        }
    }

    pub(crate) fn item(code: &str, cost: i64, opening_qty: i64) -> Item {
        Item {
            id: format!("item-{code}"),
            code: code.to_string(),
            name: format!("Item {code}"),
            unit: "pcs".to_string(),
            cost: Money::from_cents(cost),
            price: Money::from_cents(cost * 2),
            opening_qty,
            is_active: true,
        }
    }

    pub(crate) fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_accounts_round_trip() {
        let (_dir, db) = tenant_db().await;
        let catalog = db.catalog();

        catalog.insert_account(&account("2001", AccountType::Liability, false, -500)).await.unwrap();
        catalog.insert_account(&account("1001", AccountType::Asset, true, 1_000)).await.unwrap();

        let accounts = catalog.accounts().await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].code, "1001");
        assert!(accounts[0].is_cash);
        assert_eq!(accounts[1].opening_balance, Money::from_cents(-500));

        let err = catalog
            .insert_account(&account("1001", AccountType::Asset, true, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        assert!(catalog.get_account("acc-2001").await.unwrap().is_some());
        assert!(catalog.get_account("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_parties_filter_by_type() {
        let (_dir, db) = tenant_db().await;
        let catalog = db.catalog();
        catalog.insert_account(&account("1100", AccountType::Asset, false, 0)).await.unwrap();

        for (code, name, kind) in [
            ("C1", "Zubair Store", PartyType::Customer),
            ("C2", "Ali Mart", PartyType::Customer),
            ("S1", "Bulk Foods", PartyType::Supplier),
        ] {
            catalog
                .insert_party(&Party {
                    id: format!("p-{code}"),
                    code: code.to_string(),
                    name: name.to_string(),
                    party_type: kind,
                    account_id: "acc-1100".to_string(),
                    phone: None,
                    credit_days: 30,
                })
                .await
                .unwrap();
        }

        let customers = catalog.parties(Some(PartyType::Customer)).await.unwrap();
        let names: Vec<&str> = customers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ali Mart", "Zubair Store"]);

        assert_eq!(catalog.parties(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_insert_invoice_computes_totals() {
        let (_dir, db) = tenant_db().await;
        let catalog = db.catalog();
        catalog.insert_item(&item("RICE", 1_000, 5)).await.unwrap();

        let invoice = NewInvoice {
            invoice_no: "S-1".to_string(),
            invoice_type: InvoiceType::Sale,
            invoice_date: date("2026-01-05"),
            due_date: None,
            party_id: None,
            discount: Money::from_cents(200),
            tax: Money::from_cents(100),
            paid: Money::zero(),
            lines: vec![NewInvoiceLine {
                item_id: "item-RICE".to_string(),
                quantity: 3,
                rate: Money::from_cents(2_000),
            }],
        };
        assert_eq!(invoice.net(), Money::from_cents(5_900));
        catalog.insert_invoice(&invoice).await.unwrap();

        let err = catalog.insert_invoice(&invoice).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let mut empty = invoice.clone();
        empty.invoice_no = "S-2".to_string();
        empty.lines.clear();
        assert!(matches!(
            catalog.insert_invoice(&empty).await,
            Err(DbError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn test_unbalanced_voucher_rejected() {
        let (_dir, db) = tenant_db().await;
        let catalog = db.catalog();
        catalog.insert_account(&account("1001", AccountType::Asset, true, 0)).await.unwrap();
        catalog.insert_account(&account("5001", AccountType::Expense, false, 0)).await.unwrap();

        let mut voucher = NewVoucher {
            voucher_no: "CP-1".to_string(),
            voucher_type: VoucherType::CashPayment,
            voucher_date: date("2026-01-10"),
            narration: Some("Shop rent".to_string()),
            entries: vec![
                NewVoucherEntry {
                    account_id: "acc-5001".to_string(),
                    debit: Money::from_cents(5_000),
                    credit: Money::zero(),
                    narration: None,
                },
                NewVoucherEntry {
                    account_id: "acc-1001".to_string(),
                    debit: Money::zero(),
                    credit: Money::from_cents(4_000),
                    narration: None,
                },
            ],
        };
        assert!(matches!(
            catalog.insert_voucher(&voucher).await,
            Err(DbError::InvalidData(_))
        ));

        voucher.entries[1].credit = Money::from_cents(5_000);
        catalog.insert_voucher(&voucher).await.unwrap();
    }
}
