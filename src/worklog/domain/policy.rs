//! Merge-key and field-retention policy for the daily table.

use super::{TaskEntry, TaskName};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How inbound task names are compared with existing daily rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskNameMatching {
    /// `"Fix Bug"` and `"fix bug"` address the same row.
    #[default]
    CaseInsensitive,
    /// Task names must match exactly.
    CaseSensitive,
}

impl TaskNameMatching {
    /// Returns `true` when both names address the same row.
    #[must_use]
    pub fn matches(self, existing: &TaskName, incoming: &TaskName) -> bool {
        match self {
            Self::CaseInsensitive => existing.folded() == incoming.folded(),
            Self::CaseSensitive => existing == incoming,
        }
    }
}

/// Which branch a merged row keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchRetention {
    /// Every merge overwrites the branch.
    #[default]
    LatestWins,
    /// The branch of the first commit of the day is kept.
    FirstWins,
}

/// Merge policy applied by the task aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergePolicy {
    /// Task name comparison.
    #[serde(default)]
    pub task_name_matching: TaskNameMatching,
    /// Branch retention on merge.
    #[serde(default)]
    pub branch_retention: BranchRetention,
}

impl MergePolicy {
    /// Returns `true` when `entry` is the row for `(date, task_name)`.
    #[must_use]
    pub fn is_same_entry(&self, entry: &TaskEntry, date: NaiveDate, task_name: &TaskName) -> bool {
        entry.date() == date
            && self
                .task_name_matching
                .matches(entry.task_name(), task_name)
    }
}
