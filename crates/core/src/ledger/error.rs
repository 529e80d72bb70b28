//! Error types for ledger operations.

use rust_decimal::Decimal;
use thiserror::Error;

use moneta_shared::types::{AccountId, CurrencyCode, TransactionId};
use moneta_shared::AppError;

/// Errors raised by the ledger engine.
///
/// Every failure aborts the whole unit of work for the operation; no
/// partial balance mutation is ever persisted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The account does not exist or is not owned by the caller.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// The transaction does not exist or is not owned by the caller.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// The operation references a currency the account has never been
    /// initialised with.
    #[error("Currency {currency} not found in the balance of account {account_id}")]
    CurrencyNotFound {
        /// The account that was inspected.
        account_id: AccountId,
        /// The uninitialised currency.
        currency: CurrencyCode,
    },

    /// The transfer source lacks funds. Never raised for plain expenses.
    #[error(
        "Insufficient {currency} balance in account {account_id}: \
         {available} available, {requested} requested"
    )]
    InsufficientFunds {
        /// The source account.
        account_id: AccountId,
        /// The transfer currency.
        currency: CurrencyCode,
        /// Balance at the time of the check.
        available: Decimal,
        /// Requested transfer magnitude.
        requested: Decimal,
    },

    /// Transfer source and destination are the same account.
    #[error("Cannot transfer from account {0} to itself")]
    SelfTransfer(AccountId),

    /// The supplied amount is zero or negative.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// The stored transaction's account references do not match its kind.
    #[error("Transaction {0} has inconsistent account references")]
    MalformedTransaction(TransactionId),

    /// An account row lock could not be acquired within the bounded wait.
    /// The caller may retry the identical operation.
    #[error("Account {0} is locked by a concurrent operation, please retry")]
    Contention(AccountId),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(_)
            | LedgerError::TransactionNotFound(_)
            | LedgerError::CurrencyNotFound { .. } => Self::NotFound(err.to_string()),
            LedgerError::InsufficientFunds { .. } => Self::BusinessRule(err.to_string()),
            LedgerError::SelfTransfer(_) | LedgerError::NonPositiveAmount(_) => {
                Self::Validation(err.to_string())
            }
            LedgerError::MalformedTransaction(_) => Self::Internal(err.to_string()),
            LedgerError::Contention(_) => Self::Contention(err.to_string()),
        }
    }
}
