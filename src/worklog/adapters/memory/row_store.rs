//! In-memory row store for tests and local runs.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::worklog::{
    domain::{ENTRY_COLUMNS, EntryId, TableKind, TaskEntry},
    ports::{RowId, RowStore, RowStoreError, RowStoreResult, StoredRow},
};

/// Thread-safe in-memory row store.
///
/// Supports injecting append failures per table and a fixed latency before
/// every operation, so rollover and timeout paths can be exercised.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRowStore {
    state: Arc<RwLock<InMemoryRowState>>,
}

#[derive(Debug, Default)]
struct InMemoryRowState {
    tables: BTreeMap<TableKind, InMemoryTable>,
    failing_appends: HashSet<TableKind>,
    latency: Option<Duration>,
}

#[derive(Debug, Default)]
struct InMemoryTable {
    next_row: u64,
    rows: Vec<StoredRow>,
}

impl InMemoryTable {
    fn contains(&self, id: EntryId) -> bool {
        self.rows.iter().any(|row| row.entry.id() == id)
    }

    fn push(&mut self, entry: TaskEntry) {
        self.next_row = self.next_row.saturating_add(1);
        self.rows.push(StoredRow {
            id: RowId::new(self.next_row),
            entry,
        });
    }
}

fn poisoned(err: &dyn std::fmt::Display) -> RowStoreError {
    RowStoreError::unavailable(std::io::Error::other(err.to_string()))
}

impl InMemoryRowStore {
    /// Creates an empty store with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with the given tables already present.
    #[must_use]
    pub fn with_tables(tables: impl IntoIterator<Item = TableKind>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.write() {
            for table in tables {
                state.tables.entry(table).or_default();
            }
        }
        store
    }

    /// Returns the header row of `table`, or `None` when it does not exist.
    #[must_use]
    pub fn header(&self, table: TableKind) -> Option<Vec<&'static str>> {
        let state = self.state.read().ok()?;
        state
            .tables
            .contains_key(&table)
            .then(|| ENTRY_COLUMNS.to_vec())
    }

    /// Makes every subsequent append to `table` fail.
    pub fn fail_appends_to(&self, table: TableKind) {
        if let Ok(mut state) = self.state.write() {
            state.failing_appends.insert(table);
        }
    }

    /// Stops injecting append failures for `table`.
    pub fn restore_appends_to(&self, table: TableKind) {
        if let Ok(mut state) = self.state.write() {
            state.failing_appends.remove(&table);
        }
    }

    /// Delays every subsequent operation by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut state) = self.state.write() {
            state.latency = latency;
        }
    }

    async fn simulate_latency(&self) -> RowStoreResult<()> {
        let latency = self.read_state()?.latency;
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    fn read_state(&self) -> RowStoreResult<RwLockReadGuard<'_, InMemoryRowState>> {
        self.state.read().map_err(|err| poisoned(&err))
    }

    fn write_state(&self) -> RowStoreResult<RwLockWriteGuard<'_, InMemoryRowState>> {
        self.state.write().map_err(|err| poisoned(&err))
    }
}

fn table_mut(state: &mut InMemoryRowState, table: TableKind) -> RowStoreResult<&mut InMemoryTable> {
    state
        .tables
        .get_mut(&table)
        .ok_or(RowStoreError::TableMissing(table))
}

#[async_trait]
impl RowStore for InMemoryRowStore {
    async fn table_exists(&self, table: TableKind) -> RowStoreResult<bool> {
        self.simulate_latency().await?;
        Ok(self.read_state()?.tables.contains_key(&table))
    }

    async fn ensure_table(&self, table: TableKind) -> RowStoreResult<bool> {
        self.simulate_latency().await?;
        let mut state = self.write_state()?;
        if state.tables.contains_key(&table) {
            return Ok(false);
        }
        state.tables.insert(table, InMemoryTable::default());
        Ok(true)
    }

    async fn read_rows(&self, table: TableKind) -> RowStoreResult<Vec<StoredRow>> {
        self.simulate_latency().await?;
        let state = self.read_state()?;
        state
            .tables
            .get(&table)
            .map(|stored| stored.rows.clone())
            .ok_or(RowStoreError::TableMissing(table))
    }

    async fn append_rows(&self, table: TableKind, entries: &[TaskEntry]) -> RowStoreResult<usize> {
        self.simulate_latency().await?;
        let mut state = self.write_state()?;
        if state.failing_appends.contains(&table) {
            return Err(RowStoreError::unavailable(std::io::Error::other(format!(
                "injected append failure for table '{table}'"
            ))));
        }
        let stored = table_mut(&mut state, table)?;
        let mut appended = 0_usize;
        for entry in entries {
            if stored.contains(entry.id()) {
                continue;
            }
            stored.push(entry.clone());
            appended = appended.saturating_add(1);
        }
        Ok(appended)
    }

    async fn update_row(
        &self,
        table: TableKind,
        row: RowId,
        entry: &TaskEntry,
    ) -> RowStoreResult<()> {
        self.simulate_latency().await?;
        let mut state = self.write_state()?;
        let stored = table_mut(&mut state, table)?;
        let target = stored
            .rows
            .iter_mut()
            .find(|candidate| candidate.id == row)
            .ok_or(RowStoreError::RowNotFound { table, row })?;
        target.entry = entry.clone();
        Ok(())
    }

    async fn delete_row(&self, table: TableKind, row: RowId) -> RowStoreResult<()> {
        self.simulate_latency().await?;
        let mut state = self.write_state()?;
        let stored = table_mut(&mut state, table)?;
        let before = stored.rows.len();
        stored.rows.retain(|candidate| candidate.id != row);
        if stored.rows.len() == before {
            return Err(RowStoreError::RowNotFound { table, row });
        }
        Ok(())
    }

    async fn clear(&self, table: TableKind) -> RowStoreResult<usize> {
        self.simulate_latency().await?;
        let mut state = self.write_state()?;
        let stored = table_mut(&mut state, table)?;
        let removed = stored.rows.len();
        stored.rows.clear();
        Ok(removed)
    }
}
