//! Payload validation run before any balance is touched.
//!
//! Malformed payloads never reach the engine; everything here maps to the
//! `InvalidRequest` class of failures.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EditPayload, EntryPayload, TransferPayload};

fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount(amount));
    }
    Ok(())
}

/// Validates an income or expense payload.
///
/// # Errors
///
/// Returns `NonPositiveAmount` for a zero or negative magnitude.
pub fn validate_entry(payload: &EntryPayload) -> Result<(), LedgerError> {
    validate_amount(payload.amount)
}

/// Validates a transfer payload.
///
/// # Errors
///
/// Returns `NonPositiveAmount` for a zero or negative magnitude, or
/// `SelfTransfer` when source and destination are the same account.
pub fn validate_transfer(payload: &TransferPayload) -> Result<(), LedgerError> {
    validate_amount(payload.amount)?;
    if payload.from_account_id == payload.to_account_id {
        return Err(LedgerError::SelfTransfer(payload.from_account_id));
    }
    Ok(())
}

/// Validates an edit payload.
///
/// # Errors
///
/// Returns `NonPositiveAmount` for a zero or negative magnitude.
pub fn validate_edit(payload: &EditPayload) -> Result<(), LedgerError> {
    validate_amount(payload.amount)
}
