//! Logical tables held by the row store.

use super::ParseTableKindError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column headers of the daily, weekly and archive tables.
pub const ENTRY_COLUMNS: [&str; 7] = [
    "Date",
    "Task Name",
    "Description",
    "Time (hrs)",
    "Status",
    "Git Branch",
    "Commit SHA",
];

/// Column headers of the task registry table.
pub const REGISTRY_COLUMNS: [&str; 2] = ["Task Name", "Last Used Timestamp"];

/// One of the three entry tables.
///
/// The derived ordering is the lock acquisition order: daily before weekly
/// before archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Today's in-progress entries.
    Daily,
    /// Entries accumulated for the current week.
    Weekly,
    /// Permanent history.
    Archive,
}

impl TableKind {
    /// All tables in lock acquisition order.
    pub const ALL: [Self; 3] = [Self::Daily, Self::Weekly, Self::Archive];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Archive => "archive",
        }
    }
}

impl TryFrom<&str> for TableKind {
    type Error = ParseTableKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "archive" => Ok(Self::Archive),
            _ => Err(ParseTableKindError(value.to_owned())),
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
