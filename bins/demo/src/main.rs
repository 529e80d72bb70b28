//! Seeded walkthrough of the Moneta ledger for local development.
//!
//! Creates two accounts, runs entries, a transfer, and an edit against
//! them, then prints the resulting listing and monthly report as JSON.
//!
//! Usage: cargo run --bin demo

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moneta_core::ledger::{EditPayload, EntryPayload, TransferPayload};
use moneta_shared::types::{CurrencyCode, PageQuery, UserId};
use moneta_shared::AppConfig;
use moneta_store::repositories::{
    AccountRepository, LedgerRepository, NewAccount, ReportRepository, TransactionFilter,
    TransactionRepository,
};
use moneta_store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moneta=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let store = Arc::new(MemoryStore::from_config(&config));
    let ledger = LedgerRepository::new(store.clone());
    let accounts = AccountRepository::new(store.clone());
    let transactions = TransactionRepository::new(store.clone());
    let reports = ReportRepository::new(store);

    let user_id = UserId::new();
    let usd = CurrencyCode::new("USD")?;
    let eur = CurrencyCode::new("EUR")?;

    info!("creating accounts");
    let checking = accounts.create_account(
        user_id,
        NewAccount {
            group: "cash".to_string(),
            name: "Checking".to_string(),
            opening_balances: vec![(usd.clone(), dec!(2500)), (eur.clone(), dec!(300))],
        },
    )?;
    let savings = accounts.create_account(
        user_id,
        NewAccount {
            group: "savings".to_string(),
            name: "Savings".to_string(),
            opening_balances: vec![(usd.clone(), dec!(0))],
        },
    )?;

    info!("recording activity");
    ledger
        .record_income(
            user_id,
            EntryPayload {
                account_id: checking.id,
                currency_code: usd.clone(),
                amount: dec!(4200),
                description: "Salary".to_string(),
                tags: vec!["work".to_string()],
                date: date(2025, 8, 1),
            },
        )
        .await?;
    let groceries = ledger
        .record_expense(
            user_id,
            EntryPayload {
                account_id: checking.id,
                currency_code: usd.clone(),
                amount: dec!(180.40),
                description: "Groceries".to_string(),
                tags: vec!["food".to_string()],
                date: date(2025, 8, 3),
            },
        )
        .await?;
    ledger
        .record_transfer(
            user_id,
            TransferPayload {
                from_account_id: checking.id,
                from_currency_code: usd.clone(),
                to_account_id: savings.id,
                amount: dec!(1000),
                description: None,
                tags: vec![],
                date: date(2025, 8, 5),
            },
        )
        .await?;

    info!("correcting the groceries amount");
    ledger
        .edit_transaction(
            user_id,
            groceries.id,
            EditPayload {
                currency_code: usd,
                amount: dec!(165.90),
                description: "Groceries".to_string(),
                tags: vec!["food".to_string()],
                date: date(2025, 8, 3),
            },
        )
        .await?;

    let page = transactions.list_transactions(
        user_id,
        &TransactionFilter::default(),
        PageQuery::new(0, config.pagination.default_limit),
    );
    println!("transactions (newest first, {} total):", page.total);
    println!("{}", serde_json::to_string_pretty(&page.data)?);

    let checking = accounts.find_account(user_id, checking.id).await?;
    let savings = accounts.find_account(user_id, savings.id).await?;
    println!("checking balance: {}", serde_json::to_string(&checking.balance)?);
    println!("savings balance: {}", serde_json::to_string(&savings.balance)?);

    let rows = reports.list_reports(user_id, 2025);
    println!("2025 monthly report:");
    println!("{}", serde_json::to_string_pretty(&rows)?);

    Ok(())
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
