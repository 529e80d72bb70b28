//! Record store and repositories for Moneta.
//!
//! The persistence collaborator is a generic record store
//! ([`memory::MemoryStore`]) exposing scoped find/save/remove per entity and
//! ordered account row locking with a bounded wait. The repositories built
//! on it carry the business operations:
//!
//! - [`repositories::LedgerRepository`] - the balance-consistency engine
//! - [`repositories::AccountRepository`] - account CRUD and opening balances
//! - [`repositories::TransactionRepository`] - filtered, paginated listing
//! - [`repositories::ReportRepository`] - yearly report assembly

pub mod memory;
pub mod records;
pub mod repositories;

pub use memory::MemoryStore;
pub use records::{AccountRecord, TransactionRecord};
pub use repositories::{
    AccountRepository, LedgerRepository, ReportRepository, TransactionRepository,
};
