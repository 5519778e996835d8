//! Error types for worklog domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing worklog domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorklogDomainError {
    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// The hours value is negative, not finite, or too large to store.
    #[error("invalid hours value '{0}', expected a finite non-negative number")]
    InvalidHours(String),

    /// Accumulating hours on an entry exceeded the storable maximum.
    #[error("accumulated hours for task '{0}' overflowed")]
    HoursOverflow(String),
}

/// Error returned while parsing a table name from persistence or config.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown table: {0}")]
pub struct ParseTableKindError(pub String);

/// Error returned while parsing a cycle schedule expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid schedule '{value}': {reason}")]
pub struct ParseScheduleError {
    /// The rejected schedule expression.
    pub value: String,
    /// Why the expression was rejected.
    pub reason: String,
}

impl ParseScheduleError {
    pub(crate) fn new(value: &str, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}
