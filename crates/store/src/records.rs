//! Stored record shapes for accounts and transactions.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use moneta_core::ledger::{LedgerError, TransactionEffect, TransactionKind};
use moneta_shared::types::{AccountId, BalanceMap, CurrencyCode, TransactionId, UserId};

/// A stored account.
///
/// `balance` is mutated only by the ledger engine; every nonzero balance
/// key arising from ledger activity is also present in `currencies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account ID.
    pub id: AccountId,
    /// Owning user; all lookups are scoped by this.
    pub user_id: UserId,
    /// Free-form group label (e.g. "cash", "savings").
    pub group: String,
    /// Display name.
    pub name: String,
    /// Per-currency signed balances.
    pub balance: BalanceMap,
    /// Currency codes declared for this account.
    pub currencies: BTreeSet<CurrencyCode>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A stored transaction.
///
/// Exactly one of `account_id` (income/expense) or `account_from` plus
/// `account_to` (transfer) is populated, consistent with `kind`. The stored
/// `amount` is signed: income +, expense -, transfer + with the direction in
/// the account references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction ID.
    pub id: TransactionId,
    /// Owning user.
    pub user_id: UserId,
    /// Transaction kind; immutable across edits.
    pub kind: TransactionKind,
    /// Stored signed amount.
    pub amount: Decimal,
    /// Transaction currency.
    pub currency: CurrencyCode,
    /// Calendar date (no time-of-day semantics).
    pub date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// Ordered tag list.
    pub tags: Vec<String>,
    /// The affected account, for income/expense.
    pub account_id: Option<AccountId>,
    /// Transfer source account.
    pub account_from: Option<AccountId>,
    /// Transfer destination account.
    pub account_to: Option<AccountId>,
    /// Source account for transfers, `None` otherwise.
    pub related_source: Option<AccountId>,
    /// Soft exclusion from default views; reports ignore this.
    pub hide: bool,
    /// Creation timestamp; listings order by this, most recent first.
    pub created_at: DateTime<Utc>,
    /// Store-assigned monotonic sequence, the ordering tiebreak when
    /// creation timestamps collide.
    pub seq: u64,
}

impl TransactionRecord {
    /// Reconstructs the balance effect this record currently represents.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTransaction` when the account references are
    /// inconsistent with the kind.
    pub fn effect(&self) -> Result<TransactionEffect, LedgerError> {
        TransactionEffect::from_stored(
            self.id,
            self.kind,
            self.amount,
            self.currency.clone(),
            self.account_id,
            self.account_from,
            self.account_to,
        )
    }
}
