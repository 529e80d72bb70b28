//! Report types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use moneta_shared::types::CurrencyCode;

use crate::ledger::TransactionKind;

/// Short month labels for report rows, January first.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The slice of a stored transaction the report fold needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Transaction kind; transfers are excluded from totals but still
    /// contribute their currency to the observed set.
    pub kind: TransactionKind,
    /// Transaction currency.
    pub currency: CurrencyCode,
    /// Stored signed amount (income +, expense -).
    pub amount: Decimal,
    /// Transaction date; selects the month bucket.
    pub date: NaiveDate,
}

/// One month's totals, one bucket triple per observed currency.
///
/// All buckets are seeded to zero for every observed currency, so a month
/// without activity in some currency still carries its columns.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyRow {
    /// Short month label ("Jan".."Dec").
    pub month: &'static str,
    /// Income total per currency (non-negative).
    pub income: BTreeMap<CurrencyCode, Decimal>,
    /// Expense total per currency, accumulated as negative values.
    pub expenses: BTreeMap<CurrencyCode, Decimal>,
    /// `income - |expenses|` per currency.
    pub net_worth: BTreeMap<CurrencyCode, Decimal>,
}

impl MonthlyRow {
    /// Creates a row with all buckets seeded to zero for the given currencies.
    #[must_use]
    pub fn seeded<'a>(
        month: &'static str,
        currencies: impl Iterator<Item = &'a CurrencyCode>,
    ) -> Self {
        let zeroes: BTreeMap<CurrencyCode, Decimal> = currencies
            .map(|currency| (currency.clone(), Decimal::ZERO))
            .collect();
        Self {
            month,
            income: zeroes.clone(),
            expenses: zeroes.clone(),
            net_worth: zeroes,
        }
    }
}
