//! Task registry entries used for recency sorting.

use super::TaskName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A known task and when it last received a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    task_name: TaskName,
    last_used: DateTime<Utc>,
}

impl RegistryEntry {
    /// Creates a registry entry.
    #[must_use]
    pub const fn new(task_name: TaskName, last_used: DateTime<Utc>) -> Self {
        Self {
            task_name,
            last_used,
        }
    }

    /// Returns the task name.
    #[must_use]
    pub const fn task_name(&self) -> &TaskName {
        &self.task_name
    }

    /// Returns when the task was last used.
    #[must_use]
    pub const fn last_used(&self) -> DateTime<Utc> {
        self.last_used
    }
}

/// Sorts entries most recently used first; ties keep name order.
pub fn sort_by_recency(entries: &mut [RegistryEntry]) {
    entries.sort_by(|left, right| {
        right
            .last_used
            .cmp(&left.last_used)
            .then_with(|| left.task_name.cmp(&right.task_name))
    });
}
