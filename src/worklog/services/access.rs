//! Per-table async locks and timeout bounds for row store access.
//!
//! Every writer acquires its tables in [`TableKind`] order (daily, weekly,
//! archive), so two writers can never wait on each other in a cycle.

use crate::worklog::{
    domain::TableKind,
    ports::{RowStoreError, RowStoreResult},
};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Default wait for a table lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound for one row store operation.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(15);

/// A table lock was not acquired in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timed out after {waited:?} waiting for the '{table}' table lock")]
pub struct LockTimeout {
    /// Table whose lock was contended.
    pub table: TableKind,
    /// How long the caller waited.
    pub waited: Duration,
}

/// One exclusive lock per entry table.
#[derive(Debug)]
pub struct TableLocks {
    daily: RwLock<()>,
    weekly: RwLock<()>,
    archive: RwLock<()>,
    timeout: Duration,
}

/// Guards held for a set of tables; released on drop.
#[derive(Debug)]
pub struct HeldTables<'a> {
    tables: Vec<TableKind>,
    _readers: Vec<RwLockReadGuard<'a, ()>>,
    _writers: Vec<RwLockWriteGuard<'a, ()>>,
}

impl HeldTables<'_> {
    /// Returns the locked tables in acquisition order.
    #[must_use]
    pub fn tables(&self) -> &[TableKind] {
        &self.tables
    }
}

impl TableLocks {
    /// Creates unlocked tables with the given acquisition timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            daily: RwLock::new(()),
            weekly: RwLock::new(()),
            archive: RwLock::new(()),
            timeout,
        }
    }

    /// Returns the acquisition timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    const fn lock_for(&self, table: TableKind) -> &RwLock<()> {
        match table {
            TableKind::Daily => &self.daily,
            TableKind::Weekly => &self.weekly,
            TableKind::Archive => &self.archive,
        }
    }

    /// Acquires exclusive access to `tables` in fixed order.
    ///
    /// # Errors
    ///
    /// Returns [`LockTimeout`] naming the first table that could not be
    /// locked; locks already taken are released.
    pub async fn write(&self, tables: &[TableKind]) -> Result<HeldTables<'_>, LockTimeout> {
        let mut ordered = tables.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let mut writers = Vec::with_capacity(ordered.len());
        for table in &ordered {
            let guard = tokio::time::timeout(self.timeout, self.lock_for(*table).write())
                .await
                .map_err(|_| LockTimeout {
                    table: *table,
                    waited: self.timeout,
                })?;
            writers.push(guard);
        }
        Ok(HeldTables {
            tables: ordered,
            _readers: Vec::new(),
            _writers: writers,
        })
    }

    /// Acquires shared access to one table.
    ///
    /// # Errors
    ///
    /// Returns [`LockTimeout`] when a writer holds the table for longer
    /// than the timeout.
    pub async fn read(&self, table: TableKind) -> Result<HeldTables<'_>, LockTimeout> {
        let guard = tokio::time::timeout(self.timeout, self.lock_for(table).read())
            .await
            .map_err(|_| LockTimeout {
                table,
                waited: self.timeout,
            })?;
        Ok(HeldTables {
            tables: vec![table],
            _readers: vec![guard],
            _writers: Vec::new(),
        })
    }
}

impl Default for TableLocks {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT)
    }
}

/// Runs one row store operation with a deadline.
///
/// # Errors
///
/// Returns [`RowStoreError::Timeout`] when `operation` does not finish within
/// `limit`, otherwise whatever the operation returned.
pub async fn bounded<T>(
    operation: &'static str,
    table: TableKind,
    limit: Duration,
    call: impl Future<Output = RowStoreResult<T>>,
) -> RowStoreResult<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| RowStoreError::Timeout { operation, table })?
}
