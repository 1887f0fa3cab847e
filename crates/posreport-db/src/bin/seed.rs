//! # Seed Data Generator
//!
//! Populates a SQLite tenant database with a small trading company's books
//! for development and demos.
//!
//! ## Usage
//! ```bash
//! # 90 days of activity into ./tenant_dev.db
//! cargo run -p posreport-db --bin seed
//!
//! # Longer history, custom file, and register it in a master catalog
//! cargo run -p posreport-db --bin seed -- --days 180 --db ./data/demo.db \
//!     --master ./data/master.db --code DEMO
//! ```
//!
//! ## Generated Data
//! - Chart of accounts: cash, bank, capital, sales, purchases, expenses,
//!   one ledger account per customer and supplier
//! - Customers with 7-30 credit days, suppliers with 30-45
//! - Daily sales (walk-in cash and credit), periodic purchases, occasional
//!   returns, monthly rent and salaries
//! - Every document is posted to the ledger, so the trial balance balances

use chrono::{Datelike, Duration, NaiveDate, Utc};
use posreport_core::{
    Account, AccountType, DbProvider, InvoiceType, Item, Money, Party, PartyType, Tenant,
    VoucherType,
};
use posreport_db::{
    CatalogRepository, MasterDb, MasterDbConfig, NewInvoice, NewInvoiceLine, NewLedgerEntry,
    NewTenant, NewVoucher, NewVoucherEntry, TenantPoolConfig, TenantPools,
};
use std::env;
use std::path::PathBuf;

const CASH: &str = "acc-1001";
const BANK: &str = "acc-1002";
const SALES: &str = "acc-4001";
const SALES_RETURNS: &str = "acc-4002";
const PURCHASES: &str = "acc-5001";
const PURCHASE_RETURNS: &str = "acc-5002";
const RENT: &str = "acc-5101";
const SALARIES: &str = "acc-5102";
const UTILITIES: &str = "acc-5103";

/// (code, name, type, is_cash, opening cents)
const ACCOUNTS: &[(&str, &str, AccountType, bool, i64)] = &[
    ("1001", "Cash in Hand", AccountType::Asset, true, 500_000),
    ("1002", "Bank - Current Account", AccountType::Asset, false, 2_000_000),
    ("3001", "Owner's Capital", AccountType::Equity, false, -2_500_000),
    ("4001", "Sales", AccountType::Income, false, 0),
    ("4002", "Sales Returns", AccountType::Income, false, 0),
    ("5001", "Purchases", AccountType::Expense, false, 0),
    ("5002", "Purchase Returns", AccountType::Expense, false, 0),
    ("5101", "Shop Rent", AccountType::Expense, false, 0),
    ("5102", "Salaries", AccountType::Expense, false, 0),
    ("5103", "Utilities", AccountType::Expense, false, 0),
];

/// (name, credit days)
const CUSTOMERS: &[(&str, i64)] = &[
    ("Al-Madina Kiryana", 15),
    ("Bismillah Traders", 30),
    ("City Super Store", 7),
    ("Faisal Mart", 15),
    ("Green Valley Grocers", 30),
    ("Rehman Brothers", 7),
];

const SUPPLIERS: &[(&str, i64)] = &[
    ("National Foods Distribution", 30),
    ("Punjab Flour Mills", 45),
    ("Sunrise Beverages", 30),
    ("United Oil Refinery", 45),
];

/// (code, name, unit, cost cents, opening qty)
const ITEMS: &[(&str, &str, &str, i64, i64)] = &[
    ("ATTA-10", "Chakki Atta 10kg", "bag", 120_000, 40),
    ("BSMT-5", "Basmati Rice 5kg", "bag", 165_000, 25),
    ("CHNA-1", "Chana Daal 1kg", "pack", 28_000, 60),
    ("COLA-15", "Cola 1.5L", "btl", 15_000, 120),
    ("GHEE-5", "Banaspati Ghee 5kg", "tin", 240_000, 15),
    ("MLK-1", "UHT Milk 1L", "pack", 24_000, 90),
    ("OIL-1", "Cooking Oil 1L", "btl", 52_000, 80),
    ("SALT-8", "Iodized Salt 800g", "pack", 4_500, 150),
    ("SGR-1", "Sugar 1kg", "kg", 14_500, 200),
    ("TEA-9", "Black Tea 950g", "pack", 135_000, 30),
    ("WTR-15", "Mineral Water 1.5L", "btl", 8_000, 160),
    ("YGT-1", "Yogurt 1kg", "tub", 26_000, 40),
];

/// Selling price markup in percent over cost.
const MARKUP_PCT: i64 = 18;

struct Options {
    db_path: PathBuf,
    master_path: Option<PathBuf>,
    code: String,
    days: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut options = Options {
        db_path: PathBuf::from("./tenant_dev.db"),
        master_path: None,
        code: String::from("DEMO"),
        days: 90,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    options.db_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--master" | "-m" => {
                if i + 1 < args.len() {
                    options.master_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--code" | "-c" => {
                if i + 1 < args.len() {
                    options.code = args[i + 1].clone();
                    i += 1;
                }
            }
            "--days" => {
                if i + 1 < args.len() {
                    options.days = args[i + 1].parse().unwrap_or(90).clamp(1, 730);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("POS Report Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Tenant database file (default: ./tenant_dev.db)");
                println!("  -m, --master <PATH>   Also register the tenant in this master database");
                println!("  -c, --code <CODE>     Tenant code when registering (default: DEMO)");
                println!("      --days <N>        Days of activity to generate (default: 90)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 POS Report Seed Data Generator");
    println!("==================================");
    println!("Database: {}", options.db_path.display());
    println!("Days:     {}", options.days);
    println!();

    let db_path = std::path::absolute(&options.db_path)?;
    let now = Utc::now();
    let tenant = Tenant {
        id: "seed".to_string(),
        code: options.code.clone(),
        name: format!("{} Traders", options.code),
        db_provider: DbProvider::Sqlite,
        connection_string: db_path.display().to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let pools = TenantPools::new(TenantPoolConfig::new("."));
    pools.initialize(&tenant).await?;
    let db = pools.get(&tenant).await?;
    let catalog = db.catalog();

    println!("✓ Connected to tenant database");
    println!("✓ Migrations applied");

    let existing = catalog.accounts().await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} accounts", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
    } else {
        let start = std::time::Instant::now();
        let counts = seed_books(&catalog, options.days).await?;
        println!();
        println!(
            "✓ Generated {} invoices and {} vouchers in {:?}",
            counts.0,
            counts.1,
            start.elapsed()
        );

        let tb = db.reports().trial_balance(now.date_naive(), false).await?;
        println!(
            "  Trial balance: Dr {} / Cr {} ({})",
            tb.total_debit,
            tb.total_credit,
            if tb.is_balanced { "balanced" } else { "NOT balanced" }
        );
    }

    if let Some(master_path) = options.master_path {
        let master = MasterDb::new(MasterDbConfig::new(&master_path)).await?;
        match master.tenants().get_by_code(&options.code).await? {
            Some(existing) => println!("⚠ Tenant {} already registered ({})", existing.code, existing.id),
            None => {
                let created = master
                    .tenants()
                    .create(&NewTenant {
                        code: tenant.code.clone(),
                        name: tenant.name.clone(),
                        db_provider: DbProvider::Sqlite,
                        connection_string: tenant.connection_string.clone(),
                        is_active: true,
                    })
                    .await?;
                println!("✓ Registered tenant {} in {}", created.code, master_path.display());
            }
        }
        master.close().await;
    }

    pools.close_all().await;

    println!();
    println!("✓ Seed complete!");
    Ok(())
}

/// Writes the chart, parties, items and `days` of documents.
/// Returns `(invoices, vouchers)` written.
async fn seed_books(
    catalog: &CatalogRepository,
    days: i64,
) -> Result<(usize, usize), Box<dyn std::error::Error>> {
    for (code, name, account_type, is_cash, opening) in ACCOUNTS {
        catalog
            .insert_account(&Account {
                id: format!("acc-{code}"),
                code: code.to_string(),
                name: name.to_string(),
                account_type: *account_type,
                is_cash: *is_cash,
                opening_balance: Money::from_cents(*opening),
                is_active: true,
            })
            .await?;
    }

    let mut customers = Vec::new();
    for (idx, (name, credit_days)) in CUSTOMERS.iter().enumerate() {
        customers.push(insert_party(catalog, idx, name, *credit_days, PartyType::Customer).await?);
    }
    let mut suppliers = Vec::new();
    for (idx, (name, credit_days)) in SUPPLIERS.iter().enumerate() {
        suppliers.push(insert_party(catalog, idx, name, *credit_days, PartyType::Supplier).await?);
    }
    println!("✓ {} accounts, {} parties", ACCOUNTS.len(), customers.len() + suppliers.len());

    let mut items = Vec::new();
    for (code, name, unit, cost, opening_qty) in ITEMS {
        let item = Item {
            id: format!("item-{code}"),
            code: code.to_string(),
            name: name.to_string(),
            unit: unit.to_string(),
            cost: Money::from_cents(*cost),
            price: Money::from_cents(cost * (100 + MARKUP_PCT) / 100),
            opening_qty: *opening_qty,
            is_active: true,
        };
        catalog.insert_item(&item).await?;
        items.push(item);
    }
    println!("✓ {} items", items.len());

    let mut seq = Sequence::default();
    let first_day = Utc::now().date_naive() - Duration::days(days - 1);

    for day in 0..days {
        let date = first_day + Duration::days(day);
        let n = day as usize;

        // Three sales a day: one walk-in, two on credit
        for slot in 0..3 {
            let seed = n * 3 + slot;
            let party = if slot == 0 { None } else { Some(&customers[seed % customers.len()]) };
            let lines = pick_lines(&items, seed, 1 + seed % 3, |item| item.price);
            sale(catalog, &mut seq, date, party, lines, seed).await?;
        }

        if day % 5 == 0 {
            let supplier = &suppliers[(n / 5) % suppliers.len()];
            let lines = pick_lines(&items, n, 3, |item| item.cost)
                .into_iter()
                .map(|line| NewInvoiceLine {
                    quantity: line.quantity * 12,
                    ..line
                })
                .collect();
            purchase(catalog, &mut seq, date, supplier, lines, n).await?;
        }

        if day % 11 == 10 {
            let customer = &customers[n % customers.len()];
            let item = &items[n % items.len()];
            sale_return(catalog, &mut seq, date, customer, item).await?;
        }

        if day % 23 == 22 {
            let supplier = &suppliers[n % suppliers.len()];
            let item = &items[(n + 5) % items.len()];
            purchase_return(catalog, &mut seq, date, supplier, item).await?;
        }

        if date.day() == 1 || day == 0 {
            expense(catalog, &mut seq, date, VoucherType::CashPayment, RENT, 8_500_000, "Shop rent").await?;
            expense(catalog, &mut seq, date, VoucherType::BankPayment, SALARIES, 12_000_000, "Staff salaries")
                .await?;
        }
        if day % 30 == 14 {
            let bill = 1_200_000 + (n as i64 % 7) * 35_000;
            expense(catalog, &mut seq, date, VoucherType::CashPayment, UTILITIES, bill, "Electricity bill").await?;
        }

        if (day + 1) % 30 == 0 {
            println!("  Generated {} days...", day + 1);
        }
    }

    Ok((seq.invoices, seq.vouchers))
}

#[derive(Default)]
struct Sequence {
    sale: u32,
    sale_return: u32,
    purchase: u32,
    purchase_return: u32,
    receipt: u32,
    payment: u32,
    bank: u32,
    journal: u32,
    invoices: usize,
    vouchers: usize,
}

async fn insert_party(
    catalog: &CatalogRepository,
    idx: usize,
    name: &str,
    credit_days: i64,
    party_type: PartyType,
) -> Result<Party, Box<dyn std::error::Error>> {
    let (prefix, base, account_type) = match party_type {
        PartyType::Customer => ("C", 1201, AccountType::Asset),
        PartyType::Supplier => ("S", 2101, AccountType::Liability),
    };
    let code = format!("{prefix}{:03}", idx + 1);
    let account_code = (base + idx).to_string();

    catalog
        .insert_account(&Account {
            id: format!("acc-{account_code}"),
            code: account_code.clone(),
            name: name.to_string(),
            account_type,
            is_cash: false,
            opening_balance: Money::zero(),
            is_active: true,
        })
        .await?;

    let party = Party {
        id: format!("party-{code}"),
        code,
        name: name.to_string(),
        party_type,
        account_id: format!("acc-{account_code}"),
        phone: Some(format!("0300-{:07}", 1_000_000 + idx * 7_919)),
        credit_days,
    };
    catalog.insert_party(&party).await?;
    Ok(party)
}

fn pick_lines(
    items: &[Item],
    seed: usize,
    count: usize,
    rate: impl Fn(&Item) -> Money,
) -> Vec<NewInvoiceLine> {
    (0..count)
        .map(|k| {
            let item = &items[(seed * 7 + k * 5) % items.len()];
            NewInvoiceLine {
                item_id: item.id.clone(),
                quantity: 1 + ((seed + k) % 4) as i64,
                rate: rate(item),
            }
        })
        .collect()
}

async fn post(
    catalog: &CatalogRepository,
    date: NaiveDate,
    invoice_id: &str,
    debit_account: &str,
    credit_account: &str,
    amount: Money,
) -> Result<(), Box<dyn std::error::Error>> {
    for (account_id, debit, credit) in [
        (debit_account, amount, Money::zero()),
        (credit_account, Money::zero(), amount),
    ] {
        catalog
            .post_entry(&NewLedgerEntry {
                entry_date: date,
                account_id: account_id.to_string(),
                voucher_id: None,
                invoice_id: Some(invoice_id.to_string()),
                debit,
                credit,
                narration: None,
            })
            .await?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn voucher(
    catalog: &CatalogRepository,
    seq: &mut Sequence,
    date: NaiveDate,
    voucher_type: VoucherType,
    debit_account: &str,
    credit_account: &str,
    amount: Money,
    narration: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let voucher_no = match voucher_type {
        VoucherType::CashReceipt | VoucherType::BankReceipt => {
            seq.receipt += 1;
            format!("RV-{:05}", seq.receipt)
        }
        VoucherType::CashPayment => {
            seq.payment += 1;
            format!("CP-{:05}", seq.payment)
        }
        VoucherType::BankPayment => {
            seq.bank += 1;
            format!("BP-{:05}", seq.bank)
        }
        VoucherType::Journal => {
            seq.journal += 1;
            format!("JV-{:05}", seq.journal)
        }
    };

    catalog
        .insert_voucher(&NewVoucher {
            voucher_no,
            voucher_type,
            voucher_date: date,
            narration: Some(narration),
            entries: vec![
                NewVoucherEntry {
                    account_id: debit_account.to_string(),
                    debit: amount,
                    credit: Money::zero(),
                    narration: None,
                },
                NewVoucherEntry {
                    account_id: credit_account.to_string(),
                    debit: Money::zero(),
                    credit: amount,
                    narration: None,
                },
            ],
        })
        .await?;
    seq.vouchers += 1;
    Ok(())
}

async fn sale(
    catalog: &CatalogRepository,
    seq: &mut Sequence,
    date: NaiveDate,
    customer: Option<&Party>,
    lines: Vec<NewInvoiceLine>,
    seed: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    seq.sale += 1;
    let mut invoice = NewInvoice {
        invoice_no: format!("S-{:05}", seq.sale),
        invoice_type: InvoiceType::Sale,
        invoice_date: date,
        due_date: None,
        party_id: customer.map(|c| c.id.clone()),
        discount: Money::zero(),
        tax: Money::zero(),
        paid: Money::zero(),
        lines,
    };
    // Round-figure discount on larger bills
    if invoice.gross().cents() > 200_000 {
        invoice.discount = Money::from_cents(invoice.gross().cents() % 10_000);
    }
    let net = invoice.net();

    invoice.paid = match customer {
        None => net,
        // Some credit customers pay part on the spot
        Some(_) => Money::from_cents(net.cents() * ((seed % 3) as i64 * 25) / 100),
    };

    let id = catalog.insert_invoice(&invoice).await?;
    seq.invoices += 1;

    match customer {
        None => post(catalog, date, &id, CASH, SALES, net).await?,
        Some(c) => {
            post(catalog, date, &id, &c.account_id, SALES, net).await?;
            if invoice.paid.is_positive() {
                let narration = format!("Received against {}", invoice.invoice_no);
                voucher(catalog, seq, date, VoucherType::CashReceipt, CASH, &c.account_id, invoice.paid, narration)
                    .await?;
            }
        }
    }
    Ok(())
}

async fn purchase(
    catalog: &CatalogRepository,
    seq: &mut Sequence,
    date: NaiveDate,
    supplier: &Party,
    lines: Vec<NewInvoiceLine>,
    seed: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    seq.purchase += 1;
    let mut invoice = NewInvoice {
        invoice_no: format!("P-{:05}", seq.purchase),
        invoice_type: InvoiceType::Purchase,
        invoice_date: date,
        due_date: Some(date + Duration::days(supplier.credit_days)),
        party_id: Some(supplier.id.clone()),
        discount: Money::zero(),
        tax: Money::zero(),
        paid: Money::zero(),
        lines,
    };
    invoice.tax = Money::from_cents(invoice.gross().cents() / 100);
    let net = invoice.net();
    if seed % 2 == 0 {
        invoice.paid = Money::from_cents(net.cents() / 2);
    }

    let id = catalog.insert_invoice(&invoice).await?;
    seq.invoices += 1;

    post(catalog, date, &id, PURCHASES, &supplier.account_id, net).await?;
    if invoice.paid.is_positive() {
        let narration = format!("Paid against {}", invoice.invoice_no);
        voucher(catalog, seq, date, VoucherType::BankPayment, &supplier.account_id, BANK, invoice.paid, narration)
            .await?;
    }
    Ok(())
}

async fn sale_return(
    catalog: &CatalogRepository,
    seq: &mut Sequence,
    date: NaiveDate,
    customer: &Party,
    item: &Item,
) -> Result<(), Box<dyn std::error::Error>> {
    seq.sale_return += 1;
    let invoice = NewInvoice {
        invoice_no: format!("SR-{:05}", seq.sale_return),
        invoice_type: InvoiceType::SaleReturn,
        invoice_date: date,
        due_date: None,
        party_id: Some(customer.id.clone()),
        discount: Money::zero(),
        tax: Money::zero(),
        paid: Money::zero(),
        lines: vec![NewInvoiceLine {
            item_id: item.id.clone(),
            quantity: 1,
            rate: item.price,
        }],
    };
    let id = catalog.insert_invoice(&invoice).await?;
    seq.invoices += 1;
    post(catalog, date, &id, SALES_RETURNS, &customer.account_id, invoice.net()).await
}

async fn purchase_return(
    catalog: &CatalogRepository,
    seq: &mut Sequence,
    date: NaiveDate,
    supplier: &Party,
    item: &Item,
) -> Result<(), Box<dyn std::error::Error>> {
    seq.purchase_return += 1;
    let invoice = NewInvoice {
        invoice_no: format!("PR-{:05}", seq.purchase_return),
        invoice_type: InvoiceType::PurchaseReturn,
        invoice_date: date,
        due_date: None,
        party_id: Some(supplier.id.clone()),
        discount: Money::zero(),
        tax: Money::zero(),
        paid: Money::zero(),
        lines: vec![NewInvoiceLine {
            item_id: item.id.clone(),
            quantity: 2,
            rate: item.cost,
        }],
    };
    let id = catalog.insert_invoice(&invoice).await?;
    seq.invoices += 1;
    post(catalog, date, &id, &supplier.account_id, PURCHASE_RETURNS, invoice.net()).await
}

async fn expense(
    catalog: &CatalogRepository,
    seq: &mut Sequence,
    date: NaiveDate,
    voucher_type: VoucherType,
    expense_account: &str,
    cents: i64,
    narration: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = if voucher_type == VoucherType::BankPayment { BANK } else { CASH };
    voucher(
        catalog,
        seq,
        date,
        voucher_type,
        expense_account,
        source,
        Money::from_cents(cents),
        format!("{narration} {}", date.format("%b %Y")),
    )
    .await
}
