//! In-memory record store with row-level account locking.
//!
//! This is the persistence collaborator the engine's correctness depends
//! on: every balance-mutating operation runs between `lock_accounts` and
//! the drop of the returned guards, so reads and writes against the locked
//! rows form one atomic unit of work. Multi-account lock acquisition is
//! ordered by ascending account id, which rules out deadlock between
//! opposite-direction transfers on the same account pair; waits are bounded
//! by `lock_wait` and surface as the retryable contention error.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};

use moneta_core::ledger::LedgerError;
use moneta_shared::types::{AccountId, TransactionId, UserId};
use moneta_shared::AppConfig;

use crate::records::{AccountRecord, TransactionRecord};
use crate::repositories::transaction::TransactionFilter;

/// Account row guards held for the duration of one unit of work.
///
/// Dropping this releases every row lock.
pub struct LockedAccounts {
    guards: Vec<OwnedMutexGuard<AccountRecord>>,
}

impl LockedAccounts {
    /// Returns the locked record for an account id.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&AccountRecord> {
        self.guards.iter().map(|g| &**g).find(|r| r.id == id)
    }

    /// Returns the locked record for an account id, mutably.
    pub fn get_mut(&mut self, id: AccountId) -> Option<&mut AccountRecord> {
        self.guards.iter_mut().map(|g| &mut **g).find(|r| r.id == id)
    }
}

/// An account row: the owner held outside the mutex so ownership can be
/// checked without taking the row lock. Ownership never changes after
/// creation.
struct AccountRow {
    owner: UserId,
    handle: Arc<Mutex<AccountRecord>>,
}

/// In-memory record store.
pub struct MemoryStore {
    accounts: RwLock<HashMap<AccountId, AccountRow>>,
    transactions: RwLock<HashMap<TransactionId, TransactionRecord>>,
    seq: AtomicU64,
    lock_wait: Duration,
}

impl MemoryStore {
    /// Creates a store with the given bounded row-lock wait.
    #[must_use]
    pub fn new(lock_wait: Duration) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            transactions: RwLock::new(HashMap::new()),
            seq: AtomicU64::new(0),
            lock_wait,
        }
    }

    /// Creates a store configured from the application configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Duration::from_millis(config.store.lock_wait_ms))
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Inserts a new account record.
    pub fn insert_account(&self, record: AccountRecord) {
        let mut accounts = self
            .accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        accounts.insert(
            record.id,
            AccountRow {
                owner: record.user_id,
                handle: Arc::new(Mutex::new(record)),
            },
        );
    }

    /// Resolves the lock handle for an account, scoped to its owner.
    /// Absent and foreign rows are indistinguishable to the caller.
    fn account_handle(
        &self,
        user_id: UserId,
        id: AccountId,
    ) -> Result<Arc<Mutex<AccountRecord>>, LedgerError> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        accounts
            .get(&id)
            .filter(|row| row.owner == user_id)
            .map(|row| row.handle.clone())
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Locks the given accounts for one atomic unit of work.
    ///
    /// Ids are deduplicated and locked in ascending order so that any two
    /// operations contending on an overlapping account set acquire their
    /// locks in the same order. Each acquisition waits at most `lock_wait`.
    ///
    /// Ownership is checked before any waiting, so a caller never blocks
    /// on, or learns the lock state of, a row it does not own.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if any account is absent or owned by another user
    /// (no existence leakage across owners); `Contention` if a row lock
    /// could not be acquired within the bounded wait.
    pub async fn lock_accounts(
        &self,
        user_id: UserId,
        ids: &[AccountId],
    ) -> Result<LockedAccounts, LedgerError> {
        let mut sorted: Vec<AccountId> = ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for id in sorted {
            let handle = self.account_handle(user_id, id)?;
            let guard = tokio::time::timeout(self.lock_wait, handle.lock_owned())
                .await
                .map_err(|_| LedgerError::Contention(id))?;
            guards.push(guard);
        }

        Ok(LockedAccounts { guards })
    }

    /// Reads one account scoped to its owner, returning a snapshot.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` or `Contention` as for `lock_accounts`.
    pub async fn read_account(
        &self,
        user_id: UserId,
        id: AccountId,
    ) -> Result<AccountRecord, LedgerError> {
        let locked = self.lock_accounts(user_id, &[id]).await?;
        locked
            .get(id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Returns snapshots of every account owned by the user.
    ///
    /// Foreign rows are filtered out before any lock is taken, so listing
    /// only ever contends on the caller's own accounts.
    ///
    /// # Errors
    ///
    /// `Contention` if one of the caller's own row locks could not be
    /// acquired within the bounded wait.
    pub async fn snapshot_accounts(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AccountRecord>, LedgerError> {
        let handles: Vec<(AccountId, Arc<Mutex<AccountRecord>>)> = {
            let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
            accounts
                .iter()
                .filter(|(_, row)| row.owner == user_id)
                .map(|(id, row)| (*id, row.handle.clone()))
                .collect()
        };

        let mut snapshots = Vec::new();
        for (id, handle) in handles {
            let guard = tokio::time::timeout(self.lock_wait, handle.lock())
                .await
                .map_err(|_| LedgerError::Contention(id))?;
            snapshots.push(guard.clone());
        }
        Ok(snapshots)
    }

    /// Removes an account owned by the user. No cascade: the user's
    /// transactions referencing it are left in place.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` or `Contention` as for `lock_accounts`.
    pub async fn remove_account(
        &self,
        user_id: UserId,
        id: AccountId,
    ) -> Result<(), LedgerError> {
        // Hold the row lock across the removal so an in-flight engine
        // operation on this account finishes or fails before it vanishes.
        let _locked = self.lock_accounts(user_id, &[id]).await?;
        let mut accounts = self
            .accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        accounts.remove(&id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    /// Inserts a transaction, stamping the store-assigned sequence used as
    /// the ordering tiebreak. Returns the stored record.
    pub fn insert_transaction(&self, mut record: TransactionRecord) -> TransactionRecord {
        record.seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let mut transactions = self
            .transactions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        transactions.insert(record.id, record.clone());
        record
    }

    /// Overwrites an existing transaction record in place.
    pub fn save_transaction(&self, record: TransactionRecord) {
        let mut transactions = self
            .transactions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        transactions.insert(record.id, record);
    }

    /// Finds one transaction scoped to its owner.
    #[must_use]
    pub fn find_transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
    ) -> Option<TransactionRecord> {
        let transactions = self
            .transactions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        transactions
            .get(&id)
            .filter(|t| t.user_id == user_id)
            .cloned()
    }

    /// Removes one transaction scoped to its owner.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound` when absent or owned by another user.
    pub fn remove_transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut transactions = self
            .transactions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match transactions.remove(&id) {
            Some(t) if t.user_id == user_id => Ok(t),
            Some(t) => {
                transactions.insert(id, t);
                Err(LedgerError::TransactionNotFound(id))
            }
            None => Err(LedgerError::TransactionNotFound(id)),
        }
    }

    /// Finds the user's transactions matching a filter, newest first,
    /// with the total count of all matches.
    #[must_use]
    pub fn find_transactions(
        &self,
        user_id: UserId,
        filter: &TransactionFilter,
        skip: u64,
        limit: u64,
    ) -> (Vec<TransactionRecord>, u64) {
        let transactions = self
            .transactions
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut matches: Vec<TransactionRecord> = transactions
            .values()
            .filter(|t| t.user_id == user_id && filter.matches(t))
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });

        let total = matches.len() as u64;
        let page: Vec<TransactionRecord> = matches
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();

        (page, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use moneta_core::ledger::TransactionKind;
    use moneta_shared::types::{BalanceMap, CurrencyCode};
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;

    fn store() -> MemoryStore {
        MemoryStore::new(Duration::from_millis(100))
    }

    fn account(user_id: UserId) -> AccountRecord {
        let now = Utc::now();
        AccountRecord {
            id: AccountId::new(),
            user_id,
            group: "cash".to_string(),
            name: "Wallet".to_string(),
            balance: BalanceMap::new(),
            currencies: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn transaction(user_id: UserId) -> TransactionRecord {
        TransactionRecord {
            id: TransactionId::new(),
            user_id,
            kind: TransactionKind::Income,
            amount: dec!(10),
            currency: CurrencyCode::new("USD").unwrap(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            description: String::new(),
            tags: vec![],
            account_id: Some(AccountId::new()),
            account_from: None,
            account_to: None,
            related_source: None,
            hide: false,
            created_at: Utc::now(),
            seq: 0,
        }
    }

    #[tokio::test]
    async fn test_lock_accounts_scopes_by_owner() {
        let store = store();
        let owner = UserId::new();
        let other = UserId::new();
        let record = account(owner);
        let id = record.id;
        store.insert_account(record);

        assert!(store.lock_accounts(owner, &[id]).await.is_ok());
        assert_eq!(
            store.lock_accounts(other, &[id]).await.err(),
            Some(LedgerError::AccountNotFound(id))
        );
    }

    #[tokio::test]
    async fn test_lock_timeout_surfaces_contention() {
        let store = Arc::new(MemoryStore::new(Duration::from_millis(20)));
        let owner = UserId::new();
        let record = account(owner);
        let id = record.id;
        store.insert_account(record);

        let held = store.lock_accounts(owner, &[id]).await.unwrap();
        let result = store.lock_accounts(owner, &[id]).await;
        assert_eq!(result.err(), Some(LedgerError::Contention(id)));
        drop(held);

        assert!(store.lock_accounts(owner, &[id]).await.is_ok());
    }

    #[tokio::test]
    async fn test_locked_foreign_row_still_reads_as_not_found() {
        let store = Arc::new(MemoryStore::new(Duration::from_millis(20)));
        let owner = UserId::new();
        let record = account(owner);
        let id = record.id;
        store.insert_account(record);

        // A foreign caller probing a held row must not see its lock state.
        let held = store.lock_accounts(owner, &[id]).await.unwrap();
        let result = store.lock_accounts(UserId::new(), &[id]).await;
        assert_eq!(result.err(), Some(LedgerError::AccountNotFound(id)));
        drop(held);
    }

    #[tokio::test]
    async fn test_duplicate_lock_ids_are_deduplicated() {
        let store = store();
        let owner = UserId::new();
        let record = account(owner);
        let id = record.id;
        store.insert_account(record);

        // Locking the same id twice in one request must not self-deadlock.
        let locked = store.lock_accounts(owner, &[id, id]).await.unwrap();
        assert!(locked.get(id).is_some());
    }

    #[tokio::test]
    async fn test_insert_transaction_stamps_monotonic_seq() {
        let store = store();
        let user = UserId::new();
        let a = store.insert_transaction(transaction(user));
        let b = store.insert_transaction(transaction(user));
        assert!(b.seq > a.seq);
    }

    #[tokio::test]
    async fn test_find_transaction_scopes_by_owner() {
        let store = store();
        let owner = UserId::new();
        let stored = store.insert_transaction(transaction(owner));

        assert!(store.find_transaction(owner, stored.id).is_some());
        assert!(store.find_transaction(UserId::new(), stored.id).is_none());
    }
}
