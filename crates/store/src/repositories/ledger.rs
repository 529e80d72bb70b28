//! The ledger engine: every operation that moves account balances.
//!
//! Each operation follows the same shape: validate the payload, lock the
//! affected account rows, run every check against the locked state, and
//! only then mutate. A failed check leaves balances and the transaction
//! log untouched.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use moneta_core::ledger::{
    validate_edit, validate_entry, validate_transfer, BalanceDelta, EditPayload, EntryPayload,
    LedgerError, TransactionEffect, TransactionKind, TransferPayload,
};
use moneta_shared::types::{AccountId, BalanceMap, TransactionId, UserId};

use crate::memory::{LockedAccounts, MemoryStore};
use crate::records::TransactionRecord;

/// Ledger engine over the record store.
#[derive(Clone)]
pub struct LedgerRepository {
    store: Arc<MemoryStore>,
}

impl LedgerRepository {
    /// Creates a new ledger engine.
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Records an income against one account, crediting its currency
    /// bucket with the magnitude.
    ///
    /// # Errors
    ///
    /// `NonPositiveAmount` for a bad magnitude, `AccountNotFound` for a
    /// missing or foreign account, `CurrencyNotFound` when the currency is
    /// not initialised on the account, `Contention` on a lock timeout.
    pub async fn record_income(
        &self,
        user_id: UserId,
        payload: EntryPayload,
    ) -> Result<TransactionRecord, LedgerError> {
        validate_entry(&payload)?;
        let effect = TransactionEffect::Income {
            account_id: payload.account_id,
            currency: payload.currency_code.clone(),
            amount: payload.amount,
        };
        self.record_entry(user_id, TransactionKind::Income, effect, payload)
            .await
    }

    /// Records an expense against one account, debiting its currency
    /// bucket. Overdraft is allowed: the balance may go negative.
    ///
    /// # Errors
    ///
    /// Same failure set as `record_income`.
    pub async fn record_expense(
        &self,
        user_id: UserId,
        payload: EntryPayload,
    ) -> Result<TransactionRecord, LedgerError> {
        validate_entry(&payload)?;
        let effect = TransactionEffect::Expense {
            account_id: payload.account_id,
            currency: payload.currency_code.clone(),
            amount: payload.amount,
        };
        self.record_entry(user_id, TransactionKind::Expense, effect, payload)
            .await
    }

    async fn record_entry(
        &self,
        user_id: UserId,
        kind: TransactionKind,
        effect: TransactionEffect,
        payload: EntryPayload,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut locked = self
            .store
            .lock_accounts(user_id, &[payload.account_id])
            .await?;
        let account = locked
            .get(payload.account_id)
            .ok_or(LedgerError::AccountNotFound(payload.account_id))?;
        if !account.balance.contains(&payload.currency_code) {
            return Err(LedgerError::CurrencyNotFound {
                account_id: payload.account_id,
                currency: payload.currency_code.clone(),
            });
        }

        apply_deltas(&mut locked, &effect.apply());

        let record = self.store.insert_transaction(TransactionRecord {
            id: TransactionId::new(),
            user_id,
            kind,
            amount: kind.signed_amount(payload.amount),
            currency: payload.currency_code,
            date: payload.date,
            description: payload.description,
            tags: payload.tags,
            account_id: Some(payload.account_id),
            account_from: None,
            account_to: None,
            related_source: None,
            hide: false,
            created_at: Utc::now(),
            seq: 0,
        });

        info!(
            %user_id,
            transaction_id = %record.id,
            kind = %kind,
            amount = %record.amount,
            currency = %record.currency,
            "recorded entry"
        );
        Ok(record)
    }

    /// Moves money between two accounts of the same user in the source
    /// account's currency. The destination bucket is created at zero if
    /// absent; the source must hold at least the transferred magnitude.
    ///
    /// # Errors
    ///
    /// `NonPositiveAmount` or `SelfTransfer` for a bad payload,
    /// `AccountNotFound` for a missing or foreign account,
    /// `CurrencyNotFound` when the source lacks the currency,
    /// `InsufficientFunds` when the source bucket is short, `Contention`
    /// on a lock timeout.
    pub async fn record_transfer(
        &self,
        user_id: UserId,
        payload: TransferPayload,
    ) -> Result<TransactionRecord, LedgerError> {
        validate_transfer(&payload)?;

        let mut locked = self
            .store
            .lock_accounts(user_id, &[payload.from_account_id, payload.to_account_id])
            .await?;

        let source = locked
            .get(payload.from_account_id)
            .ok_or(LedgerError::AccountNotFound(payload.from_account_id))?;
        if !source.balance.contains(&payload.from_currency_code) {
            return Err(LedgerError::CurrencyNotFound {
                account_id: payload.from_account_id,
                currency: payload.from_currency_code.clone(),
            });
        }
        let available = source.balance.amount_or_zero(&payload.from_currency_code);
        if available < payload.amount {
            return Err(LedgerError::InsufficientFunds {
                account_id: payload.from_account_id,
                currency: payload.from_currency_code.clone(),
                available,
                requested: payload.amount,
            });
        }
        let description = payload
            .description
            .unwrap_or_else(|| format!("Transfer from {}", payload.from_account_id));

        let effect = TransactionEffect::Transfer {
            from: payload.from_account_id,
            to: payload.to_account_id,
            currency: payload.from_currency_code.clone(),
            amount: payload.amount,
        };
        apply_deltas(&mut locked, &effect.apply());

        let record = self.store.insert_transaction(TransactionRecord {
            id: TransactionId::new(),
            user_id,
            kind: TransactionKind::Transfer,
            amount: payload.amount,
            currency: payload.from_currency_code,
            date: payload.date,
            description,
            tags: payload.tags,
            account_id: None,
            account_from: Some(payload.from_account_id),
            account_to: Some(payload.to_account_id),
            related_source: Some(payload.from_account_id),
            hide: false,
            created_at: Utc::now(),
            seq: 0,
        });

        info!(
            %user_id,
            transaction_id = %record.id,
            from = %payload.from_account_id,
            to = %payload.to_account_id,
            amount = %record.amount,
            currency = %record.currency,
            "recorded transfer"
        );
        Ok(record)
    }

    /// Edits an existing transaction in place: the old effect is reverted
    /// under the old currency and amount, then the new effect applied under
    /// the new ones, as one atomic unit. The kind and account references
    /// are immutable.
    ///
    /// Editing with the original values is an exact no-op on balances.
    ///
    /// # Errors
    ///
    /// `NonPositiveAmount` for a bad magnitude, `TransactionNotFound` for
    /// a missing or foreign transaction, `InsufficientFunds` when
    /// reapplying a transfer overdraws the source, `MalformedTransaction`
    /// for inconsistent stored references, `Contention` on a lock timeout.
    pub async fn edit_transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
        payload: EditPayload,
    ) -> Result<TransactionRecord, LedgerError> {
        validate_edit(&payload)?;

        let stored = self
            .store
            .find_transaction(user_id, id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        let old_effect = stored.effect()?;

        let mut locked = self
            .store
            .lock_accounts(user_id, &old_effect.accounts())
            .await?;

        // Re-read under the row locks. The account references are
        // immutable, so the lock set cannot have changed since the first
        // read even if a concurrent edit slipped in between.
        let mut stored = self
            .store
            .find_transaction(user_id, id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        let old_effect = stored.effect()?;
        let new_effect = old_effect.with_terms(payload.currency_code.clone(), payload.amount);

        // Stage revert plus reapply on copies, checking as we go; the
        // locked rows are only written once everything has passed.
        let mut staged: HashMap<AccountId, BalanceMap> = old_effect
            .accounts()
            .into_iter()
            .map(|account_id| {
                locked
                    .get(account_id)
                    .map(|account| (account_id, account.balance.clone()))
                    .ok_or(LedgerError::AccountNotFound(account_id))
            })
            .collect::<Result<_, _>>()?;
        for delta in old_effect.revert() {
            if let Some(balance) = staged.get_mut(&delta.account_id) {
                balance.add(delta.currency, delta.amount);
            }
        }

        // Reapply creates the new currency key at a zero basis when it is
        // absent; only a transfer re-checks source sufficiency against the
        // reverted balance.
        if let TransactionEffect::Transfer { from, currency, amount, .. } = &new_effect {
            let balance = staged
                .get(from)
                .ok_or(LedgerError::AccountNotFound(*from))?;
            let available = balance.amount_or_zero(currency);
            if available < *amount {
                return Err(LedgerError::InsufficientFunds {
                    account_id: *from,
                    currency: currency.clone(),
                    available,
                    requested: *amount,
                });
            }
        }
        for delta in new_effect.apply() {
            if let Some(balance) = staged.get_mut(&delta.account_id) {
                balance.add(delta.currency, delta.amount);
            }
        }

        // Commit: write the staged balances through the held guards, then
        // the updated record.
        let now = Utc::now();
        for (account_id, balance) in staged {
            if let Some(account) = locked.get_mut(account_id) {
                account
                    .currencies
                    .extend(balance.iter().map(|(currency, _)| currency.clone()));
                account.balance = balance;
                account.updated_at = now;
            }
        }
        stored.amount = stored.kind.signed_amount(payload.amount);
        stored.currency = payload.currency_code;
        stored.description = payload.description;
        stored.tags = payload.tags;
        stored.date = payload.date;
        self.store.save_transaction(stored.clone());

        info!(
            %user_id,
            transaction_id = %id,
            amount = %stored.amount,
            currency = %stored.currency,
            "edited transaction"
        );
        Ok(stored)
    }
}

/// Writes a set of deltas through the held account guards, bumping the
/// touched rows' update timestamps. A newly created balance key also
/// declares the currency on the account.
fn apply_deltas(locked: &mut LockedAccounts, deltas: &[BalanceDelta]) {
    let now = Utc::now();
    for delta in deltas {
        if let Some(account) = locked.get_mut(delta.account_id) {
            account.balance.add(delta.currency.clone(), delta.amount);
            account.currencies.insert(delta.currency.clone());
            account.updated_at = now;
        }
    }
}
