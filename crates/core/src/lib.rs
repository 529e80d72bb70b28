//! Core business logic for Moneta.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here.
//!
//! # Modules
//!
//! - `ledger` - Balance effects of transactions and their validation
//! - `reports` - Monthly per-currency income/expense aggregation

pub mod ledger;
pub mod reports;
