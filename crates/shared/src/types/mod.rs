//! Common types used across the application.

pub mod currency;
pub mod id;
pub mod pagination;

pub use currency::{BalanceMap, CurrencyCode};
pub use id::*;
pub use pagination::{Page, PageQuery};
