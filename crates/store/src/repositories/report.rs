//! Report repository: monthly breakdowns over one calendar year.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use moneta_core::reports::{MonthlyRow, ReportEntry, ReportService};
use moneta_shared::types::UserId;

use crate::memory::MemoryStore;
use crate::repositories::transaction::TransactionFilter;

/// Report repository.
#[derive(Clone)]
pub struct ReportRepository {
    store: Arc<MemoryStore>,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Builds the user's monthly breakdown for one calendar year.
    ///
    /// Hidden transactions count; transfers contribute their currency to
    /// the observed set but never to the totals. A year without activity,
    /// or one outside the supported calendar range, yields an empty
    /// breakdown rather than an error.
    #[must_use]
    pub fn list_reports(&self, user_id: UserId, year: i32) -> Vec<MonthlyRow> {
        let filter = TransactionFilter {
            start_date: NaiveDate::from_ymd_opt(year, 1, 1),
            end_date: NaiveDate::from_ymd_opt(year, 12, 31),
            kind: None,
        };
        if filter.start_date.is_none() || filter.end_date.is_none() {
            return vec![];
        }

        let (transactions, total) = self.store.find_transactions(user_id, &filter, 0, u64::MAX);
        debug!(%user_id, year, total, "building monthly breakdown");

        let entries: Vec<ReportEntry> = transactions
            .into_iter()
            .map(|t| ReportEntry {
                kind: t.kind,
                currency: t.currency,
                amount: t.amount,
                date: t.date,
            })
            .collect();
        ReportService::monthly_breakdown(&entries)
    }
}
