//! Monthly per-currency income/expense aggregation.

pub mod service;
pub mod types;

pub use service::ReportService;
pub use types::{MonthlyRow, ReportEntry, MONTHS};
