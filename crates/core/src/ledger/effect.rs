//! The balance effect of a transaction, as a tagged variant per kind with
//! an explicit apply/revert pair.
//!
//! Modelling the effect separately from the stored record keeps the edit
//! protocol honest: reverting is always the exact negation of applying, so
//! "revert under the old currency, reapply under the new one" cannot drift.
//! New transaction kinds stay additive.

use rust_decimal::Decimal;

use moneta_shared::types::{AccountId, CurrencyCode, TransactionId};

use super::error::LedgerError;
use super::types::TransactionKind;

/// A signed balance change against one account's currency bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceDelta {
    /// The account whose balance moves.
    pub account_id: AccountId,
    /// The currency bucket that moves.
    pub currency: CurrencyCode,
    /// Signed amount to add to the bucket.
    pub amount: Decimal,
}

/// The net balance effect of one stored transaction.
///
/// `amount` is always the positive magnitude; direction is encoded by the
/// variant and, for transfers, the two account references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionEffect {
    /// Income adds the magnitude to one account.
    Income {
        /// Affected account.
        account_id: AccountId,
        /// Currency bucket.
        currency: CurrencyCode,
        /// Positive magnitude.
        amount: Decimal,
    },
    /// Expense subtracts the magnitude from one account.
    Expense {
        /// Affected account.
        account_id: AccountId,
        /// Currency bucket.
        currency: CurrencyCode,
        /// Positive magnitude.
        amount: Decimal,
    },
    /// Transfer moves the magnitude from one account to another.
    Transfer {
        /// Source account.
        from: AccountId,
        /// Destination account.
        to: AccountId,
        /// Currency bucket on both sides.
        currency: CurrencyCode,
        /// Positive magnitude.
        amount: Decimal,
    },
}

impl TransactionEffect {
    /// Reconstructs the effect of a stored transaction from its persisted
    /// fields. `stored_amount` carries the sign convention (income +,
    /// expense -, transfer +); the effect keeps the absolute magnitude.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTransaction` when the account references do not
    /// match the kind.
    pub fn from_stored(
        id: TransactionId,
        kind: TransactionKind,
        stored_amount: Decimal,
        currency: CurrencyCode,
        account_id: Option<AccountId>,
        account_from: Option<AccountId>,
        account_to: Option<AccountId>,
    ) -> Result<Self, LedgerError> {
        let amount = stored_amount.abs();
        match kind {
            TransactionKind::Income => {
                let account_id = account_id.ok_or(LedgerError::MalformedTransaction(id))?;
                Ok(Self::Income {
                    account_id,
                    currency,
                    amount,
                })
            }
            TransactionKind::Expense => {
                let account_id = account_id.ok_or(LedgerError::MalformedTransaction(id))?;
                Ok(Self::Expense {
                    account_id,
                    currency,
                    amount,
                })
            }
            TransactionKind::Transfer => match (account_from, account_to) {
                (Some(from), Some(to)) => Ok(Self::Transfer {
                    from,
                    to,
                    currency,
                    amount,
                }),
                _ => Err(LedgerError::MalformedTransaction(id)),
            },
        }
    }

    /// The forward effect: the deltas that record this transaction.
    #[must_use]
    pub fn apply(&self) -> Vec<BalanceDelta> {
        match self {
            Self::Income {
                account_id,
                currency,
                amount,
            } => vec![BalanceDelta {
                account_id: *account_id,
                currency: currency.clone(),
                amount: *amount,
            }],
            Self::Expense {
                account_id,
                currency,
                amount,
            } => vec![BalanceDelta {
                account_id: *account_id,
                currency: currency.clone(),
                amount: -*amount,
            }],
            Self::Transfer {
                from,
                to,
                currency,
                amount,
            } => vec![
                BalanceDelta {
                    account_id: *from,
                    currency: currency.clone(),
                    amount: -*amount,
                },
                BalanceDelta {
                    account_id: *to,
                    currency: currency.clone(),
                    amount: *amount,
                },
            ],
        }
    }

    /// The inverse effect: the deltas that undo this transaction.
    ///
    /// Always the exact negation of `apply`.
    #[must_use]
    pub fn revert(&self) -> Vec<BalanceDelta> {
        self.apply()
            .into_iter()
            .map(|delta| BalanceDelta {
                amount: -delta.amount,
                ..delta
            })
            .collect()
    }

    /// The accounts this effect touches, for lock acquisition.
    #[must_use]
    pub fn accounts(&self) -> Vec<AccountId> {
        match self {
            Self::Income { account_id, .. } | Self::Expense { account_id, .. } => {
                vec![*account_id]
            }
            Self::Transfer { from, to, .. } => vec![*from, *to],
        }
    }

    /// The same effect with a new currency and magnitude, keeping the
    /// variant and account references. This is the reapply half of the
    /// edit protocol.
    #[must_use]
    pub fn with_terms(&self, currency: CurrencyCode, amount: Decimal) -> Self {
        let amount = amount.abs();
        match self {
            Self::Income { account_id, .. } => Self::Income {
                account_id: *account_id,
                currency,
                amount,
            },
            Self::Expense { account_id, .. } => Self::Expense {
                account_id: *account_id,
                currency,
                amount,
            },
            Self::Transfer { from, to, .. } => Self::Transfer {
                from: *from,
                to: *to,
                currency,
                amount,
            },
        }
    }

    /// The kind this effect corresponds to.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        match self {
            Self::Income { .. } => TransactionKind::Income,
            Self::Expense { .. } => TransactionKind::Expense,
            Self::Transfer { .. } => TransactionKind::Transfer,
        }
    }
}
