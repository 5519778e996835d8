//! Task entry rows and the commit events merged into them.

use super::{BranchRetention, EntryId, Hours, TaskName, WorklogDomainError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Status recorded when an event does not carry one.
pub const DEFAULT_STATUS: &str = "In Progress";

/// Commit SHA recorded when an event does not carry one.
pub const DEFAULT_SHA: &str = "pending";

/// Hours recorded when an event does not carry a usable duration.
pub const DEFAULT_HOURS: Hours = Hours::from_whole(1);

/// A validated inbound commit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEvent {
    task_name: TaskName,
    message: String,
    hours: Hours,
    branch: String,
    status: String,
    sha: String,
}

impl CommitEvent {
    /// Creates an event with default status, SHA, empty branch and message.
    #[must_use]
    pub fn new(task_name: TaskName, hours: Hours) -> Self {
        Self {
            task_name,
            message: String::new(),
            hours,
            branch: String::new(),
            status: DEFAULT_STATUS.to_owned(),
            sha: DEFAULT_SHA.to_owned(),
        }
    }

    /// Sets the commit message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
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
        self.status = status.into();
        self
    }

    /// Sets the commit SHA.
    #[must_use]
    pub fn with_sha(mut self, sha: impl Into<String>) -> Self {
        self.sha = sha.into();
        self
    }

    /// Returns the task name.
    #[must_use]
    pub const fn task_name(&self) -> &TaskName {
        &self.task_name
    }

    /// Returns the commit message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the reported hours.
    #[must_use]
    pub const fn hours(&self) -> Hours {
        self.hours
    }

    /// Returns the branch.
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Returns the status label.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns the commit SHA.
    #[must_use]
    pub fn sha(&self) -> &str {
        &self.sha
    }

    fn description_lines(&self) -> impl Iterator<Item = String> + '_ {
        let message = if self.message.trim().is_empty() {
            ""
        } else {
            self.message.as_str()
        };
        message.lines().map(str::to_owned)
    }
}

/// One row of the daily, weekly or archive table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    id: EntryId,
    date: NaiveDate,
    task_name: TaskName,
    description: Vec<String>,
    hours: Hours,
    status: String,
    branch: String,
    sha: String,
}

/// Parameter object for reconstructing a persisted task entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedEntryData {
    /// Persisted entry identifier.
    pub id: EntryId,
    /// Day the entry applies to.
    pub date: NaiveDate,
    /// Task name.
    pub task_name: TaskName,
    /// Description lines in commit order.
    pub description: Vec<String>,
    /// Accumulated hours.
    pub hours: Hours,
    /// Latest status.
    pub status: String,
    /// Retained branch.
    pub branch: String,
    /// Latest commit SHA.
    pub sha: String,
}

impl TaskEntry {
    /// Creates the first entry of the day for a commit event.
    #[must_use]
    pub fn from_commit(event: &CommitEvent, date: NaiveDate) -> Self {
        Self {
            id: EntryId::new(),
            date,
            task_name: event.task_name.clone(),
            description: event.description_lines().collect(),
            hours: event.hours,
            status: event.status.clone(),
            branch: event.branch.clone(),
            sha: event.sha.clone(),
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedEntryData) -> Self {
        Self {
            id: data.id,
            date: data.date,
            task_name: data.task_name,
            description: data.description,
            hours: data.hours,
            status: data.status,
            branch: data.branch,
            sha: data.sha,
        }
    }

    /// Merges a later commit event for the same task and day.
    ///
    /// Appends the commit message lines, adds the hours, and overwrites the
    /// status and SHA. The branch follows `retention`. The task name keeps
    /// its first-seen spelling.
    ///
    /// # Errors
    ///
    /// Returns [`WorklogDomainError::HoursOverflow`] when the accumulated
    /// hours exceed the storable maximum. The entry is left unchanged.
    pub fn absorb(
        &mut self,
        event: &CommitEvent,
        retention: BranchRetention,
    ) -> Result<(), WorklogDomainError> {
        let hours = self
            .hours
            .checked_add(event.hours)
            .ok_or_else(|| WorklogDomainError::HoursOverflow(self.task_name.to_string()))?;

        self.hours = hours;
        self.description.extend(event.description_lines());
        self.status.clone_from(&event.status);
        self.sha.clone_from(&event.sha);
        if retention == BranchRetention::LatestWins {
            self.branch.clone_from(&event.branch);
        }
        Ok(())
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> EntryId {
        self.id
    }

    /// Returns the day the entry applies to.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the task name.
    #[must_use]
    pub const fn task_name(&self) -> &TaskName {
        &self.task_name
    }

    /// Returns the description lines in commit order.
    #[must_use]
    pub fn description(&self) -> &[String] {
        &self.description
    }

    /// Returns the description as stored in a single cell.
    #[must_use]
    pub fn description_text(&self) -> String {
        self.description.join("\n")
    }

    /// Returns the accumulated hours.
    #[must_use]
    pub const fn hours(&self) -> Hours {
        self.hours
    }

    /// Returns the latest status.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns the retained branch.
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Returns the latest commit SHA.
    #[must_use]
    pub fn sha(&self) -> &str {
        &self.sha
    }
}

/// Splits a stored description cell back into lines.
#[must_use]
pub fn split_description(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        return Vec::new();
    }
    cell.split('\n').map(str::to_owned).collect()
}
