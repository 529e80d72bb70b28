//! Tests for the yearly report assembly over stored transactions.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{account_with, date, entry, eur, setup, transfer, usd};

#[tokio::test]
async fn test_monthly_breakdown_over_the_requested_year() {
    let ctx = setup();
    let account = account_with(&ctx, "Wallet", &[(usd(), dec!(0))]);

    let mut jan = entry(account.id, usd(), dec!(100));
    jan.date = date(2025, 1, 10);
    ctx.ledger.record_income(ctx.user_id, jan).await.unwrap();

    let mut feb = entry(account.id, usd(), dec!(40));
    feb.date = date(2025, 2, 5);
    ctx.ledger.record_expense(ctx.user_id, feb).await.unwrap();

    // Activity in another year must not leak into the breakdown.
    let mut other_year = entry(account.id, usd(), dec!(999));
    other_year.date = date(2024, 6, 1);
    ctx.ledger.record_income(ctx.user_id, other_year).await.unwrap();

    let rows = ctx.reports.list_reports(ctx.user_id, 2025);
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[0].month, "Jan");
    assert_eq!(rows[0].income[&usd()], dec!(100));
    assert_eq!(rows[0].net_worth[&usd()], dec!(100));
    assert_eq!(rows[1].month, "Feb");
    assert_eq!(rows[1].expenses[&usd()], dec!(-40));
    assert_eq!(rows[1].net_worth[&usd()], dec!(-40));
    // Months without activity carry zero-seeded columns.
    assert_eq!(rows[5].income[&usd()], Decimal::ZERO);
}

#[tokio::test]
async fn test_transfers_seed_columns_but_not_totals() {
    let ctx = setup();
    let a = account_with(&ctx, "A", &[(eur(), dec!(500))]);
    let b = account_with(&ctx, "B", &[(eur(), dec!(0))]);

    let mut payload = transfer(a.id, b.id, eur(), dec!(200));
    payload.date = date(2025, 4, 1);
    ctx.ledger.record_transfer(ctx.user_id, payload).await.unwrap();

    let rows = ctx.reports.list_reports(ctx.user_id, 2025);
    // The transfer puts EUR in the observed currency set, so every row
    // carries EUR columns, but it contributes nothing to any total.
    assert_eq!(rows.len(), 12);
    let april = &rows[3];
    assert_eq!(april.income[&eur()], Decimal::ZERO);
    assert_eq!(april.expenses[&eur()], Decimal::ZERO);
    assert_eq!(april.net_worth[&eur()], Decimal::ZERO);
}

#[tokio::test]
async fn test_year_without_activity_yields_empty_breakdown() {
    let ctx = setup();
    let rows = ctx.reports.list_reports(ctx.user_id, 2025);
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_hidden_transactions_still_count() {
    let ctx = setup();
    let account = account_with(&ctx, "Wallet", &[(usd(), dec!(0))]);

    let mut payload = entry(account.id, usd(), dec!(75));
    payload.date = date(2025, 7, 1);
    let record = ctx.ledger.record_income(ctx.user_id, payload).await.unwrap();
    ctx.transactions.set_hidden(ctx.user_id, record.id, true).unwrap();

    let rows = ctx.reports.list_reports(ctx.user_id, 2025);
    assert_eq!(rows[6].income[&usd()], dec!(75));
}

#[tokio::test]
async fn test_currencies_aggregate_independently() {
    let ctx = setup();
    let account = account_with(&ctx, "Wallet", &[(usd(), dec!(0)), (eur(), dec!(0))]);

    let mut dollars = entry(account.id, usd(), dec!(100));
    dollars.date = date(2025, 1, 2);
    ctx.ledger.record_income(ctx.user_id, dollars).await.unwrap();

    let mut euros = entry(account.id, eur(), dec!(30));
    euros.date = date(2025, 1, 3);
    ctx.ledger.record_expense(ctx.user_id, euros).await.unwrap();

    let rows = ctx.reports.list_reports(ctx.user_id, 2025);
    let jan = &rows[0];
    assert_eq!(jan.income[&usd()], dec!(100));
    assert_eq!(jan.income[&eur()], Decimal::ZERO);
    assert_eq!(jan.expenses[&eur()], dec!(-30));
    assert_eq!(jan.net_worth[&usd()], dec!(100));
    assert_eq!(jan.net_worth[&eur()], dec!(-30));
}
