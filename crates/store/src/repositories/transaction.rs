//! Transaction repository for listing and bookkeeping operations that do
//! not move balances.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use moneta_core::ledger::{LedgerError, TransactionKind};
use moneta_shared::types::{Page, PageQuery, TransactionId, UserId};

use crate::memory::MemoryStore;
use crate::records::TransactionRecord;

/// Filter options for listing transactions. All criteria are optional and
/// combine with AND; date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by date range start.
    pub start_date: Option<NaiveDate>,
    /// Filter by date range end.
    pub end_date: Option<NaiveDate>,
    /// Filter by transaction kind.
    pub kind: Option<TransactionKind>,
}

impl TransactionFilter {
    /// Whether a record satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        if let Some(start) = self.start_date {
            if record.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if record.date > end {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if record.kind != kind {
                return false;
            }
        }
        true
    }
}

/// Transaction repository.
#[derive(Clone)]
pub struct TransactionRepository {
    store: Arc<MemoryStore>,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Lists the user's transactions matching the filter, newest first.
    ///
    /// `total` counts every match, independent of the page window. A window
    /// past the end yields an empty page with the real total.
    #[must_use]
    pub fn list_transactions(
        &self,
        user_id: UserId,
        filter: &TransactionFilter,
        page: PageQuery,
    ) -> Page<TransactionRecord> {
        let (data, total) = self
            .store
            .find_transactions(user_id, filter, page.skip, page.limit);
        debug!(%user_id, total, returned = data.len(), "listed transactions");
        Page::new(data, total)
    }

    /// Finds one transaction scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` when absent or owned by another user.
    pub fn find_transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        self.store
            .find_transaction(user_id, id)
            .ok_or(LedgerError::TransactionNotFound(id))
    }

    /// Removes one transaction. Balances are left untouched; callers that
    /// want the books to reflect the removal must revert through an edit
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` when absent or owned by another user.
    pub fn remove_transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        let removed = self.store.remove_transaction(user_id, id)?;
        debug!(%user_id, transaction_id = %id, "removed transaction");
        Ok(removed)
    }

    /// Toggles the soft-hide flag. Hidden transactions still count toward
    /// balances and reports.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` when absent or owned by another user.
    pub fn set_hidden(
        &self,
        user_id: UserId,
        id: TransactionId,
        hide: bool,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut record = self
            .store
            .find_transaction(user_id, id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        record.hide = hide;
        self.store.save_transaction(record.clone());
        Ok(record)
    }
}
