//! Task registry port: recency index of known task names.

use crate::worklog::domain::{RegistryEntry, TaskName};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Task registry contract.
///
/// Implementations create their backing table on first use. Names are
/// compared exactly.
#[async_trait]
pub trait TaskRegistry: Send + Sync {
    /// Sets the last-used timestamp, inserting the task when unknown.
    async fn touch(&self, task_name: &TaskName, at: DateTime<Utc>) -> RegistryResult<()>;

    /// Registers a new task.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTask`] when the name is taken.
    async fn create(&self, entry: &RegistryEntry) -> RegistryResult<()>;

    /// Renames a task, keeping its timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when `from` is unknown or
    /// [`RegistryError::DuplicateTask`] when `to` is already taken.
    async fn rename(&self, from: &TaskName, to: &TaskName) -> RegistryResult<()>;

    /// Removes a task.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the task is unknown.
    async fn remove(&self, task_name: &TaskName) -> RegistryResult<()>;

    /// Returns every entry in unspecified order.
    async fn list(&self) -> RegistryResult<Vec<RegistryEntry>>;
}

/// Errors returned by registry implementations.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// A task with the same name already exists.
    #[error("task already exists: {0}")]
    DuplicateTask(TaskName),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskName),

    /// The backing store could not be reached or failed.
    #[error("task registry unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl RegistryError {
    /// Wraps a backend failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
