//! Pagination types for list operations.

use serde::{Deserialize, Serialize};

/// Offset-based pagination parameters for list queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageQuery {
    /// Number of matching rows to skip.
    #[serde(default)]
    pub skip: u64,
    /// Maximum number of rows to return.
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    10
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

impl PageQuery {
    /// Creates a page query from explicit offsets.
    #[must_use]
    pub const fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }
}

/// One page of results plus the total count of all matching rows.
///
/// An empty page with `total = 0` is a valid, successful outcome for list
/// queries; it is never reported as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The rows in this page.
    pub data: Vec<T>,
    /// Total number of matching rows, ignoring pagination.
    pub total: u64,
}

impl<T> Page<T> {
    /// Creates a page of results.
    #[must_use]
    pub fn new(data: Vec<T>, total: u64) -> Self {
        Self { data, total }
    }

    /// Creates an empty page.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
        }
    }

    /// Returns true if this page carries no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
