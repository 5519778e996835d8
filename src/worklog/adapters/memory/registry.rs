//! In-memory task registry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::worklog::{
    domain::{RegistryEntry, TaskName},
    ports::{RegistryError, RegistryResult, TaskRegistry},
};

/// Thread-safe in-memory task registry.
///
/// The backing table is provisioned by the first operation, matching the
/// lazy creation of persistent registries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRegistry {
    state: Arc<RwLock<RegistryState>>,
}

#[derive(Debug, Default)]
struct RegistryState {
    entries: Option<BTreeMap<TaskName, DateTime<Utc>>>,
    unavailable: bool,
    latency: Option<Duration>,
}

impl RegistryState {
    fn provisioned(&mut self) -> RegistryResult<&mut BTreeMap<TaskName, DateTime<Utc>>> {
        if self.unavailable {
            return Err(RegistryError::unavailable(std::io::Error::other(
                "task registry marked unavailable",
            )));
        }
        Ok(self.entries.get_or_insert_with(BTreeMap::new))
    }
}

impl InMemoryTaskRegistry {
    /// Creates an unprovisioned registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once the backing table has been created.
    #[must_use]
    pub fn is_provisioned(&self) -> bool {
        self.state
            .read()
            .map(|state| state.entries.is_some())
            .unwrap_or(false)
    }

    /// Makes every subsequent operation fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.state.write() {
            state.unavailable = unavailable;
        }
    }

    /// Delays every subsequent operation by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut state) = self.state.write() {
            state.latency = latency;
        }
    }

    async fn simulate_latency(&self) {
        let latency = self.state.read().ok().and_then(|state| state.latency);
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
    }

    fn with_state<T>(
        &self,
        apply: impl FnOnce(&mut BTreeMap<TaskName, DateTime<Utc>>) -> RegistryResult<T>,
    ) -> RegistryResult<T> {
        let mut state = self
            .state
            .write()
            .map_err(|err| RegistryError::unavailable(std::io::Error::other(err.to_string())))?;
        apply(state.provisioned()?)
    }
}

#[async_trait]
impl TaskRegistry for InMemoryTaskRegistry {
    async fn touch(&self, task_name: &TaskName, at: DateTime<Utc>) -> RegistryResult<()> {
        self.simulate_latency().await;
        self.with_state(|entries| {
            entries.insert(task_name.clone(), at);
            Ok(())
        })
    }

    async fn create(&self, entry: &RegistryEntry) -> RegistryResult<()> {
        self.simulate_latency().await;
        self.with_state(|entries| {
            if entries.contains_key(entry.task_name()) {
                return Err(RegistryError::DuplicateTask(entry.task_name().clone()));
            }
            entries.insert(entry.task_name().clone(), entry.last_used());
            Ok(())
        })
    }

    async fn rename(&self, from: &TaskName, to: &TaskName) -> RegistryResult<()> {
        self.simulate_latency().await;
        self.with_state(|entries| {
            if from != to && entries.contains_key(to) {
                return Err(RegistryError::DuplicateTask(to.clone()));
            }
            let last_used = entries
                .remove(from)
                .ok_or_else(|| RegistryError::NotFound(from.clone()))?;
            entries.insert(to.clone(), last_used);
            Ok(())
        })
    }

    async fn remove(&self, task_name: &TaskName) -> RegistryResult<()> {
        self.simulate_latency().await;
        self.with_state(|entries| {
            entries
                .remove(task_name)
                .map(|_| ())
                .ok_or_else(|| RegistryError::NotFound(task_name.clone()))
        })
    }

    async fn list(&self) -> RegistryResult<Vec<RegistryEntry>> {
        self.simulate_latency().await;
        self.with_state(|entries| {
            Ok(entries
                .iter()
                .map(|(name, last_used)| RegistryEntry::new(name.clone(), *last_used))
                .collect())
        })
    }
}
