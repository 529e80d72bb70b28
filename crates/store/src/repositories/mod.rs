//! Repositories over the in-memory record store.

pub mod account;
pub mod ledger;
pub mod report;
pub mod transaction;

pub use account::{AccountRepository, AccountUpdate, NewAccount};
pub use ledger::LedgerRepository;
pub use report::ReportRepository;
pub use transaction::{TransactionFilter, TransactionRepository};
