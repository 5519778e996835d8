//! Task aggregation: merges inbound commit events into the daily table.

use super::access::{DEFAULT_OPERATION_TIMEOUT, LockTimeout, TableLocks, bounded};
use crate::worklog::{
    domain::{
        CommitEvent, DEFAULT_HOURS, DEFAULT_SHA, DEFAULT_STATUS, Hours, MergePolicy,
        ReportCalendar, TableKind, TaskEntry, TaskName, WorklogDomainError,
    },
    ports::{RegistryError, RowStore, RowStoreError, TaskRegistry},
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Raw commit event as received from a webhook caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordCommitRequest {
    task_name: String,
    message: String,
    hours: Option<f64>,
    branch: String,
    status: Option<String>,
    sha: Option<String>,
}

impl RecordCommitRequest {
    /// Creates a request for `task_name` with every other field defaulted.
    #[must_use]
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            ..Self::default()
        }
    }

    /// Sets the commit message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the reported hours.
    #[must_use]
    pub const fn with_hours(mut self, hours: f64) -> Self {
        self.hours = Some(hours);
        self
    }

    /// Sets the branch.
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Sets the status label.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the commit SHA.
    #[must_use]
    pub fn with_sha(mut self, sha: impl Into<String>) -> Self {
        self.sha = Some(sha.into());
        self
    }

    /// Validates the request into a commit event.
    ///
    /// Missing hours default to one hour; blank status and SHA fall back to
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`WorklogDomainError`] when the task name is blank or the
    /// hours are negative or not finite.
    pub fn into_event(self) -> Result<CommitEvent, WorklogDomainError> {
        let task_name = TaskName::new(&self.task_name)?;
        let hours = self.hours.map_or(Ok(DEFAULT_HOURS), Hours::from_f64)?;
        let status = non_blank(self.status).unwrap_or_else(|| DEFAULT_STATUS.to_owned());
        let sha = non_blank(self.sha).unwrap_or_else(|| DEFAULT_SHA.to_owned());

        Ok(CommitEvent::new(task_name, hours)
            .with_message(self.message)
            .with_branch(self.branch.trim())
            .with_status(status)
            .with_sha(sha))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Whether a commit opened a new row or merged into today's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A new row was appended.
    Created,
    /// An existing row for today absorbed the commit.
    Merged,
}

/// Result of recording one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommit {
    /// Whether the row was created or merged.
    pub outcome: MergeOutcome,
    /// Row contents after the commit.
    pub entry: TaskEntry,
}

/// Service-level errors for commit aggregation.
#[derive(Debug, Error)]
pub enum AggregatorError {
    /// Event validation failed.
    #[error(transparent)]
    Domain(#[from] WorklogDomainError),
    /// Row store operation failed.
    #[error(transparent)]
    Store(#[from] RowStoreError),
    /// The daily table stayed locked past the timeout.
    #[error(transparent)]
    Lock(#[from] LockTimeout),
}

impl AggregatorError {
    /// Returns `true` when the caller may retry the same event later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Domain(_) => false,
            Self::Store(err) => err.is_retryable(),
            Self::Lock(_) => true,
        }
    }
}

/// Result type for aggregation operations.
pub type AggregatorResult<T> = Result<T, AggregatorError>;

/// Merges commit events into per-task, per-day rows.
pub struct TaskAggregator<S, G, C>
where
    S: RowStore + ?Sized,
    G: TaskRegistry + ?Sized,
    C: Clock + Send + Sync + ?Sized,
{
    store: Arc<S>,
    registry: Arc<G>,
    clock: Arc<C>,
    locks: Arc<TableLocks>,
    policy: MergePolicy,
    calendar: ReportCalendar,
    operation_timeout: Duration,
}

impl<S, G, C> TaskAggregator<S, G, C>
where
    S: RowStore + ?Sized,
    G: TaskRegistry + ?Sized,
    C: Clock + Send + Sync + ?Sized,
{
    /// Creates an aggregator with the default policy and a UTC calendar.
    #[must_use]
    pub fn new(store: Arc<S>, registry: Arc<G>, clock: Arc<C>, locks: Arc<TableLocks>) -> Self {
        Self {
            store,
            registry,
            clock,
            locks,
            policy: MergePolicy::default(),
            calendar: ReportCalendar::utc(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Sets the merge policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the calendar used to decide "today".
    #[must_use]
    pub const fn with_calendar(mut self, calendar: ReportCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Sets the bound applied to each row store call.
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Returns the active merge policy.
    #[must_use]
    pub const fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Merges one commit event into today's row for its task.
    ///
    /// The registry's last-used timestamp is refreshed afterwards; a
    /// registry failure is logged and does not fail the commit.
    ///
    /// # Errors
    ///
    /// Returns [`AggregatorError::Domain`] for malformed events (nothing is
    /// written), [`AggregatorError::Store`] when the daily table is missing
    /// or the store fails, and [`AggregatorError::Lock`] when the daily
    /// table stays busy.
    pub async fn record_commit(
        &self,
        request: RecordCommitRequest,
    ) -> AggregatorResult<RecordedCommit> {
        let event = request.into_event()?;
        let now = self.clock.utc();
        let today = self.calendar.date_of(now);
        let table = TableKind::Daily;

        let recorded = {
            let _held = self.locks.write(&[table]).await?;
            self.ensure_present(table).await?;

            let rows = bounded(
                "read_rows",
                table,
                self.operation_timeout,
                self.store.read_rows(table),
            )
            .await?;
            let existing = rows
                .into_iter()
                .find(|row| self.policy.is_same_entry(&row.entry, today, event.task_name()));

            match existing {
                Some(mut row) => {
                    row.entry.absorb(&event, self.policy.branch_retention)?;
                    bounded(
                        "update_row",
                        table,
                        self.operation_timeout,
                        self.store.update_row(table, row.id, &row.entry),
                    )
                    .await?;
                    RecordedCommit {
                        outcome: MergeOutcome::Merged,
                        entry: row.entry,
                    }
                }
                None => {
                    let entry = TaskEntry::from_commit(&event, today);
                    bounded(
                        "append_rows",
                        table,
                        self.operation_timeout,
                        self.store.append_rows(table, std::slice::from_ref(&entry)),
                    )
                    .await?;
                    RecordedCommit {
                        outcome: MergeOutcome::Created,
                        entry,
                    }
                }
            }
        };

        tracing::info!(
            task = %recorded.entry.task_name(),
            date = %today,
            hours = %recorded.entry.hours(),
            outcome = ?recorded.outcome,
            "commit recorded"
        );

        let touched = tokio::time::timeout(
            self.operation_timeout,
            self.registry.touch(event.task_name(), now),
        )
        .await
        .unwrap_or_else(|_| {
            Err(RegistryError::unavailable(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "task registry touch timed out",
            )))
        });
        if let Err(err) = touched {
            tracing::warn!(
                task = %event.task_name(),
                error = %err,
                "task registry timestamp not updated"
            );
        }
        Ok(recorded)
    }

    /// Returns every row of the daily table in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`AggregatorError::Store`] when the daily table is missing or
    /// the store fails, and [`AggregatorError::Lock`] when a writer holds
    /// the table past the timeout.
    pub async fn list_entries(&self) -> AggregatorResult<Vec<TaskEntry>> {
        let table = TableKind::Daily;
        let _held = self.locks.read(table).await?;
        self.ensure_present(table).await?;
        let rows = bounded(
            "read_rows",
            table,
            self.operation_timeout,
            self.store.read_rows(table),
        )
        .await?;
        Ok(rows.into_iter().map(|row| row.entry).collect())
    }

    async fn ensure_present(&self, table: TableKind) -> AggregatorResult<()> {
        let exists = bounded(
            "table_exists",
            table,
            self.operation_timeout,
            self.store.table_exists(table),
        )
        .await?;
        if exists {
            Ok(())
        } else {
            Err(RowStoreError::TableMissing(table).into())
        }
    }
}
