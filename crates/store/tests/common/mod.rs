//! Shared setup for the repository integration tests.

// Not every test file uses every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use moneta_core::ledger::{EditPayload, EntryPayload, TransferPayload};
use moneta_shared::types::{AccountId, CurrencyCode, UserId};
use moneta_store::repositories::{
    AccountRepository, LedgerRepository, NewAccount, ReportRepository, TransactionRepository,
};
use moneta_store::{AccountRecord, MemoryStore};

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub ledger: LedgerRepository,
    pub accounts: AccountRepository,
    pub transactions: TransactionRepository,
    pub reports: ReportRepository,
    pub user_id: UserId,
}

pub fn setup() -> TestContext {
    let store = Arc::new(MemoryStore::new(Duration::from_millis(200)));
    TestContext {
        ledger: LedgerRepository::new(store.clone()),
        accounts: AccountRepository::new(store.clone()),
        transactions: TransactionRepository::new(store.clone()),
        reports: ReportRepository::new(store.clone()),
        store,
        user_id: UserId::new(),
    }
}

pub fn usd() -> CurrencyCode {
    CurrencyCode::new("USD").unwrap()
}

pub fn eur() -> CurrencyCode {
    CurrencyCode::new("EUR").unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates an account with the given opening balances, booked through the
/// normal opening-balance path.
pub fn account_with(ctx: &TestContext, name: &str, balances: &[(CurrencyCode, Decimal)]) -> AccountRecord {
    ctx.accounts
        .create_account(
            ctx.user_id,
            NewAccount {
                group: "cash".to_string(),
                name: name.to_string(),
                opening_balances: balances.to_vec(),
            },
        )
        .unwrap()
}

pub fn entry(account_id: AccountId, currency: CurrencyCode, amount: Decimal) -> EntryPayload {
    EntryPayload {
        account_id,
        currency_code: currency,
        amount,
        description: "test entry".to_string(),
        tags: vec![],
        date: date(2025, 3, 10),
    }
}

pub fn transfer(
    from: AccountId,
    to: AccountId,
    currency: CurrencyCode,
    amount: Decimal,
) -> TransferPayload {
    TransferPayload {
        from_account_id: from,
        from_currency_code: currency,
        to_account_id: to,
        amount,
        description: None,
        tags: vec![],
        date: date(2025, 3, 10),
    }
}

pub fn edit(currency: CurrencyCode, amount: Decimal) -> EditPayload {
    EditPayload {
        currency_code: currency,
        amount,
        description: "edited".to_string(),
        tags: vec!["edited".to_string()],
        date: date(2025, 3, 11),
    }
}
