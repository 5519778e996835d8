//! Task registry management for the task picker UI.

use crate::worklog::{
    domain::{RegistryEntry, TaskName, WorklogDomainError, sort_by_recency},
    ports::{RegistryError, TaskRegistry},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for registry management.
#[derive(Debug, Error)]
pub enum RegistryServiceError {
    /// A task name failed validation.
    #[error(transparent)]
    Domain(#[from] WorklogDomainError),
    /// Registry operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type for registry management.
pub type RegistryServiceResult<T> = Result<T, RegistryServiceError>;

/// Create, rename, delete and recency listing of known tasks.
pub struct TaskRegistryService<G, C>
where
    G: TaskRegistry + ?Sized,
    C: Clock + Send + Sync + ?Sized,
{
    registry: Arc<G>,
    clock: Arc<C>,
}

impl<G, C> TaskRegistryService<G, C>
where
    G: TaskRegistry + ?Sized,
    C: Clock + Send + Sync + ?Sized,
{
    /// Creates a registry service.
    #[must_use]
    pub const fn new(registry: Arc<G>, clock: Arc<C>) -> Self {
        Self { registry, clock }
    }

    /// Lists known tasks, most recently used first.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Registry`] when the registry fails.
    pub async fn list_recent(&self) -> RegistryServiceResult<Vec<RegistryEntry>> {
        let mut entries = self.registry.list().await?;
        sort_by_recency(&mut entries);
        Ok(entries)
    }

    /// Registers a task stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Domain`] for a blank name and
    /// [`RegistryServiceError::Registry`] when the name exists or the
    /// registry fails.
    pub async fn create(&self, task_name: &str) -> RegistryServiceResult<RegistryEntry> {
        let entry = RegistryEntry::new(TaskName::new(task_name)?, self.clock.utc());
        self.registry.create(&entry).await?;
        tracing::info!(task = %entry.task_name(), "task registered");
        Ok(entry)
    }

    /// Renames a task, keeping its last-used time.
    ///
    /// Rows already written under the old name are not rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Domain`] for blank names and
    /// [`RegistryServiceError::Registry`] when the old name is unknown, the
    /// new one is taken, or the registry fails.
    pub async fn rename(&self, old_name: &str, new_name: &str) -> RegistryServiceResult<()> {
        let from = TaskName::new(old_name)?;
        let to = TaskName::new(new_name)?;
        self.registry.rename(&from, &to).await?;
        tracing::info!(from = %from, to = %to, "task renamed");
        Ok(())
    }

    /// Removes a task from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Domain`] for a blank name and
    /// [`RegistryServiceError::Registry`] when the task is unknown or the
    /// registry fails.
    pub async fn remove(&self, task_name: &str) -> RegistryServiceResult<()> {
        let name = TaskName::new(task_name)?;
        self.registry.remove(&name).await?;
        tracing::info!(task = %name, "task removed");
        Ok(())
    }
}
