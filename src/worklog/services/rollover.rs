//! Rollover: copies a table snapshot downstream, then clears the source.

use super::access::{DEFAULT_OPERATION_TIMEOUT, bounded};
use crate::worklog::{
    domain::{RolloverPlan, TableKind, TaskEntry},
    ports::{RowStore, RowStoreError},
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Rows appended to one destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationCopy {
    /// Destination table.
    pub table: TableKind,
    /// Whether the table was created by this rollover.
    pub created: bool,
    /// Rows appended; rows already present by id are not counted.
    pub appended: usize,
}

/// Result of a completed rollover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverSummary {
    /// Source table that was cleared.
    pub source: TableKind,
    /// Per-destination copy results, in plan order.
    pub copies: Vec<DestinationCopy>,
    /// Rows removed from the source.
    pub cleared: usize,
}

/// Rollover failures.
#[derive(Debug, Error)]
pub enum RolloverError {
    /// Creating or appending to a destination failed; the source is intact.
    #[error("rollover of '{source_table}' into '{destination}' failed: {source}")]
    PartialRollover {
        /// Table whose rows were being copied.
        source_table: TableKind,
        /// Destination that failed.
        destination: TableKind,
        /// Underlying store failure.
        source: RowStoreError,
    },
    /// Every copy succeeded but clearing the source failed.
    #[error("rows of '{source_table}' were copied but the table was not cleared: {source}")]
    ClearFailed {
        /// Table that was not cleared.
        source_table: TableKind,
        /// Underlying store failure.
        source: RowStoreError,
    },
}

impl RolloverError {
    /// Returns `true` when re-running the cycle may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::PartialRollover { source, .. } | Self::ClearFailed { source, .. } => {
                source.is_retryable()
            }
        }
    }
}

/// Moves rows between tables for a reporting cycle.
///
/// Callers hold the write locks for every table in the plan for the whole
/// call, and pass the snapshot they read under those locks.
pub struct RolloverManager<S>
where
    S: RowStore + ?Sized,
{
    store: Arc<S>,
    operation_timeout: Duration,
}

impl<S> RolloverManager<S>
where
    S: RowStore + ?Sized,
{
    /// Creates a rollover manager.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self {
            store,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Sets the bound applied to each row store call.
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Appends `snapshot` to every destination, then clears the source.
    ///
    /// Destinations are created with their header when absent. Rows whose
    /// id a destination already holds are skipped, so retrying after a
    /// failure does not duplicate them.
    ///
    /// # Errors
    ///
    /// Returns [`RolloverError::PartialRollover`] when a destination cannot
    /// be created or appended to; the source is then left untouched.
    /// Returns [`RolloverError::ClearFailed`] when the final clear fails.
    pub async fn roll_over(
        &self,
        plan: &RolloverPlan,
        snapshot: &[TaskEntry],
    ) -> Result<RolloverSummary, RolloverError> {
        let source_table = plan.source;
        let mut copies = Vec::with_capacity(plan.destinations.len());

        for destination in &plan.destinations {
            let copy = self
                .copy_into(*destination, snapshot)
                .await
                .map_err(|source| {
                    tracing::error!(
                        source_table = %source_table,
                        destination = %destination,
                        error = %source,
                        "rollover aborted; source table left intact"
                    );
                    RolloverError::PartialRollover {
                        source_table,
                        destination: *destination,
                        source,
                    }
                })?;
            copies.push(copy);
        }

        let cleared = bounded(
            "clear",
            source_table,
            self.operation_timeout,
            self.store.clear(source_table),
        )
        .await
        .map_err(|source| RolloverError::ClearFailed {
            source_table,
            source,
        })?;

        tracing::info!(
            source_table = %source_table,
            cleared,
            destinations = copies.len(),
            "rollover complete"
        );
        Ok(RolloverSummary {
            source: source_table,
            copies,
            cleared,
        })
    }

    async fn copy_into(
        &self,
        table: TableKind,
        snapshot: &[TaskEntry],
    ) -> Result<DestinationCopy, RowStoreError> {
        let created = bounded(
            "ensure_table",
            table,
            self.operation_timeout,
            self.store.ensure_table(table),
        )
        .await?;
        if created {
            tracing::info!(table = %table, "created table with header");
        }
        let appended = bounded(
            "append_rows",
            table,
            self.operation_timeout,
            self.store.append_rows(table, snapshot),
        )
        .await?;
        if appended < snapshot.len() {
            tracing::debug!(
                table = %table,
                skipped = snapshot.len().saturating_sub(appended),
                "rows already present were skipped"
            );
        }
        Ok(DestinationCopy {
            table,
            created,
            appended,
        })
    }
}
