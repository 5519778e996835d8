//! Row store port: ordered tables of task entries.

use crate::worklog::domain::{TableKind, TaskEntry};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for row store operations.
pub type RowStoreResult<T> = Result<T, RowStoreError>;

/// Position handle of a stored row, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(u64);

impl RowId {
    /// Wraps a store-assigned row position.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row read back from a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    /// Row position handle.
    pub id: RowId,
    /// Row contents.
    pub entry: TaskEntry,
}

/// Ordered-table persistence contract.
///
/// Every table has an implicit header row created together with the table;
/// reads and clears only ever see data rows.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Reports whether the table exists.
    async fn table_exists(&self, table: TableKind) -> RowStoreResult<bool>;

    /// Creates the table with its header when absent.
    ///
    /// Returns `true` when the table was created by this call.
    async fn ensure_table(&self, table: TableKind) -> RowStoreResult<bool>;

    /// Reads every data row in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`RowStoreError::TableMissing`] when the table does not exist.
    async fn read_rows(&self, table: TableKind) -> RowStoreResult<Vec<StoredRow>>;

    /// Appends entries in order and returns how many rows were added.
    ///
    /// Entries whose identifier is already present in the table are skipped,
    /// which makes re-running an interrupted rollover safe.
    ///
    /// # Errors
    ///
    /// Returns [`RowStoreError::TableMissing`] when the table does not exist.
    async fn append_rows(&self, table: TableKind, entries: &[TaskEntry]) -> RowStoreResult<usize>;

    /// Replaces the contents of one row.
    ///
    /// # Errors
    ///
    /// Returns [`RowStoreError::RowNotFound`] when the row does not exist.
    async fn update_row(
        &self,
        table: TableKind,
        row: RowId,
        entry: &TaskEntry,
    ) -> RowStoreResult<()>;

    /// Deletes one row.
    ///
    /// # Errors
    ///
    /// Returns [`RowStoreError::RowNotFound`] when the row does not exist.
    async fn delete_row(&self, table: TableKind, row: RowId) -> RowStoreResult<()>;

    /// Deletes every data row, keeping the table and its header.
    ///
    /// Returns the number of rows removed.
    async fn clear(&self, table: TableKind) -> RowStoreResult<usize>;
}

/// Errors returned by row store implementations.
#[derive(Debug, Clone, Error)]
pub enum RowStoreError {
    /// The table has not been created.
    #[error("table '{0}' does not exist")]
    TableMissing(TableKind),

    /// The row does not exist in the table.
    #[error("row {row} not found in table '{table}'")]
    RowNotFound {
        /// Table that was addressed.
        table: TableKind,
        /// Missing row.
        row: RowId,
    },

    /// The operation did not complete in time; safe to retry.
    #[error("{operation} on table '{table}' timed out")]
    Timeout {
        /// Operation name.
        operation: &'static str,
        /// Table that was addressed.
        table: TableKind,
    },

    /// The backing store could not be reached or failed.
    #[error("row store unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl RowStoreError {
    /// Wraps a backend failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Returns `true` when repeating the operation later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable(_))
    }
}
