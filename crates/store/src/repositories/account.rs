//! Account repository: lifecycle and read operations for accounts.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use moneta_core::ledger::{LedgerError, TransactionKind};
use moneta_shared::types::{
    AccountId, BalanceMap, CurrencyCode, Page, PageQuery, TransactionId, UserId,
};

use crate::memory::MemoryStore;
use crate::records::{AccountRecord, TransactionRecord};

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Free-form group label.
    pub group: String,
    /// Display name.
    pub name: String,
    /// Initial currency buckets with their opening amounts. A zero amount
    /// initialises the bucket without recording anything.
    pub opening_balances: Vec<(CurrencyCode, Decimal)>,
}

/// Mutable account fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    /// New group label.
    pub group: Option<String>,
    /// New display name.
    pub name: Option<String>,
}

/// Account repository.
#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<MemoryStore>,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Creates an account with its currency buckets initialised.
    ///
    /// Nonzero opening amounts are booked as income transactions dated
    /// today, so account balances stay derivable from the transaction log.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount` when an opening amount is negative.
    pub fn create_account(
        &self,
        user_id: UserId,
        input: NewAccount,
    ) -> Result<AccountRecord, LedgerError> {
        for (_, amount) in &input.opening_balances {
            if *amount < Decimal::ZERO {
                return Err(LedgerError::NonPositiveAmount(*amount));
            }
        }

        let now = Utc::now();
        let mut balance = BalanceMap::new();
        for (currency, amount) in &input.opening_balances {
            balance.ensure(currency.clone());
            balance.add(currency.clone(), *amount);
        }
        let record = AccountRecord {
            id: AccountId::new(),
            user_id,
            group: input.group,
            name: input.name,
            currencies: balance.iter().map(|(c, _)| c.clone()).collect(),
            balance,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_account(record.clone());

        for (currency, amount) in input.opening_balances {
            if amount > Decimal::ZERO {
                self.store.insert_transaction(TransactionRecord {
                    id: TransactionId::new(),
                    user_id,
                    kind: TransactionKind::Income,
                    amount,
                    currency,
                    date: now.date_naive(),
                    description: "Opening balance".to_string(),
                    tags: vec![],
                    account_id: Some(record.id),
                    account_from: None,
                    account_to: None,
                    related_source: None,
                    hide: false,
                    created_at: now,
                    seq: 0,
                });
            }
        }

        info!(%user_id, account_id = %record.id, name = %record.name, "created account");
        Ok(record)
    }

    /// Finds one account scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` when absent or owned by another user, or
    /// `Contention` on a lock timeout.
    pub async fn find_account(
        &self,
        user_id: UserId,
        id: AccountId,
    ) -> Result<AccountRecord, LedgerError> {
        self.store.read_account(user_id, id).await
    }

    /// Lists the user's accounts, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns `Contention` on a lock timeout.
    pub async fn list_accounts(
        &self,
        user_id: UserId,
        page: PageQuery,
    ) -> Result<Page<AccountRecord>, LedgerError> {
        let mut accounts = self.store.snapshot_accounts(user_id).await?;
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        let total = accounts.len() as u64;
        let data: Vec<AccountRecord> = accounts
            .into_iter()
            .skip(usize::try_from(page.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
            .collect();
        Ok(Page::new(data, total))
    }

    /// Updates an account's label fields. Balances are never written here.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` when absent or owned by another user, or
    /// `Contention` on a lock timeout.
    pub async fn update_account(
        &self,
        user_id: UserId,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<AccountRecord, LedgerError> {
        let mut locked = self.store.lock_accounts(user_id, &[id]).await?;
        let account = locked
            .get_mut(id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        if let Some(group) = update.group {
            account.group = group;
        }
        if let Some(name) = update.name {
            account.name = name;
        }
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    /// Removes an account. Its transactions remain in the log.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` when absent or owned by another user, or
    /// `Contention` on a lock timeout.
    pub async fn remove_account(&self, user_id: UserId, id: AccountId) -> Result<(), LedgerError> {
        self.store.remove_account(user_id, id).await?;
        info!(%user_id, account_id = %id, "removed account");
        Ok(())
    }
}
