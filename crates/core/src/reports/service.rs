//! Report generation service.

use std::collections::BTreeSet;

use chrono::Datelike;

use moneta_shared::types::CurrencyCode;

use crate::ledger::TransactionKind;

use super::types::{MonthlyRow, ReportEntry, MONTHS};

/// Service for folding a year's transactions into monthly rows.
pub struct ReportService;

impl ReportService {
    /// Folds one calendar year's transactions into 12 monthly rows.
    ///
    /// The caller supplies every transaction dated within the year (hidden
    /// ones included). Income amounts add to the income bucket of their
    /// month; expense amounts (stored negative) accumulate as `-|amount|`
    /// in the expenses bucket; transfers contribute to neither total but do
    /// contribute their currency to the observed set. After accumulation,
    /// `net_worth = income - |expenses|` per month and currency.
    ///
    /// Returns an empty vector when there are no transactions; callers
    /// treat that as valid empty data, not an error.
    #[must_use]
    pub fn monthly_breakdown(entries: &[ReportEntry]) -> Vec<MonthlyRow> {
        if entries.is_empty() {
            return Vec::new();
        }

        let currencies: BTreeSet<CurrencyCode> =
            entries.iter().map(|entry| entry.currency.clone()).collect();

        let mut rows: Vec<MonthlyRow> = MONTHS
            .into_iter()
            .map(|month| MonthlyRow::seeded(month, currencies.iter()))
            .collect();

        for entry in entries {
            let month_index = entry.date.month0() as usize;
            let row = &mut rows[month_index];
            match entry.kind {
                TransactionKind::Income => {
                    if let Some(bucket) = row.income.get_mut(&entry.currency) {
                        *bucket += entry.amount;
                    }
                }
                TransactionKind::Expense => {
                    if let Some(bucket) = row.expenses.get_mut(&entry.currency) {
                        *bucket -= entry.amount.abs();
                    }
                }
                TransactionKind::Transfer => {}
            }
        }

        for row in &mut rows {
            for (currency, bucket) in &mut row.net_worth {
                let income = row.income.get(currency).copied().unwrap_or_default();
                let expenses = row.expenses.get(currency).copied().unwrap_or_default();
                *bucket = income - expenses.abs();
            }
        }

        rows
    }
}
