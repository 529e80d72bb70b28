//! Balance effects of transactions.
//!
//! This module implements the heart of the ledger:
//! - The transaction kinds and their signed-amount convention
//! - The tagged balance effect with an apply/revert pair per kind
//! - Request payload types for the inbound operations
//! - Payload validation run before any balance is touched
//! - Error types for ledger operations

pub mod effect;
pub mod error;
pub mod types;
pub mod validation;

pub use effect::{BalanceDelta, TransactionEffect};
pub use error::LedgerError;
pub use types::{EditPayload, EntryPayload, TransactionKind, TransferPayload};
pub use validation::{validate_edit, validate_entry, validate_transfer};
