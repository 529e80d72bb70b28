//! Domain types for ledger operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use moneta_shared::types::{AccountId, CurrencyCode};

/// The kind of a transaction. Immutable once the transaction is stored;
/// edits re-derive the stored sign from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money entering an account. Stored amount is positive.
    Income,
    /// Money leaving an account. Stored amount is the negated magnitude.
    Expense,
    /// Money moving between two accounts. Stored amount is the positive
    /// magnitude; the direction lives in the account references.
    Transfer,
}

impl TransactionKind {
    /// Derives the stored signed amount from a positive magnitude.
    #[must_use]
    pub fn signed_amount(self, magnitude: Decimal) -> Decimal {
        match self {
            Self::Income | Self::Transfer => magnitude,
            Self::Expense => -magnitude,
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            _ => Err(format!("Unknown transaction kind: {s}")),
        }
    }
}

/// Inbound payload for recording an income or expense against one account.
///
/// `amount` is always the positive magnitude supplied by the caller; the
/// engine derives the stored sign from the operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPayload {
    /// The account whose balance is affected.
    pub account_id: AccountId,
    /// Currency of the operation. Must already be initialised on the account.
    pub currency_code: CurrencyCode,
    /// Positive magnitude.
    pub amount: Decimal,
    /// Free-text description.
    pub description: String,
    /// Ordered tag list.
    pub tags: Vec<String>,
    /// Calendar date of the operation (no time-of-day semantics).
    pub date: NaiveDate,
}

/// Inbound payload for moving money between two accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferPayload {
    /// The account money is taken from.
    pub from_account_id: AccountId,
    /// Currency of the transfer. Must be initialised on the source account.
    pub from_currency_code: CurrencyCode,
    /// The account money is added to.
    pub to_account_id: AccountId,
    /// Positive magnitude.
    pub amount: Decimal,
    /// Optional description; defaults to "Transfer from {source}".
    pub description: Option<String>,
    /// Ordered tag list.
    pub tags: Vec<String>,
    /// Calendar date of the transfer.
    pub date: NaiveDate,
}

/// Inbound payload for editing an existing transaction in place.
///
/// The transaction's kind is immutable; the stored sign of the new amount
/// is re-derived from it. The currency may differ from the original, in
/// which case the old effect is reverted under the old currency and the new
/// effect applied under the new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditPayload {
    /// New currency for the transaction.
    pub currency_code: CurrencyCode,
    /// New positive magnitude.
    pub amount: Decimal,
    /// New description.
    pub description: String,
    /// New tag list.
    pub tags: Vec<String>,
    /// New calendar date.
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[rstest]
    #[case(TransactionKind::Income, dec!(100), dec!(100))]
    #[case(TransactionKind::Expense, dec!(100), dec!(-100))]
    #[case(TransactionKind::Transfer, dec!(100), dec!(100))]
    fn test_signed_amount_convention(
        #[case] kind: TransactionKind,
        #[case] magnitude: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(kind.signed_amount(magnitude), expected);
    }

    #[test]
    fn test_kind_roundtrip_through_str() {
        for kind in [
            TransactionKind::Income,
            TransactionKind::Expense,
            TransactionKind::Transfer,
        ] {
            assert_eq!(TransactionKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(TransactionKind::from_str("other").is_err());
    }

    #[test]
    fn test_kind_serde_is_snake_case() {
        let json = serde_json::to_string(&TransactionKind::Transfer).unwrap();
        assert_eq!(json, "\"transfer\"");
    }
}
