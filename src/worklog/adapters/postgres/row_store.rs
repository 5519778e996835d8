//! `PostgreSQL` row store implementation.

use super::{
    WorklogPgPool,
    models::{EntryRow, NewCatalogRow, NewEntryRow},
    schema::{ROW_STORE_DDL, worklog_rows, worklog_tables},
};
use crate::worklog::{
    domain::{
        EntryId, Hours, PersistedEntryData, TableKind, TaskEntry, TaskName, split_description,
    },
    ports::{RowId, RowStore, RowStoreError, RowStoreResult, StoredRow},
};
use async_trait::async_trait;
use chrono::Utc;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed row store.
///
/// Logical tables are rows in `worklog_tables`; data rows of every table
/// share `worklog_rows`, ordered by their serial id.
#[derive(Debug, Clone)]
pub struct PostgresRowStore {
    pool: WorklogPgPool,
}

impl PostgresRowStore {
    /// Creates a row store from a connection pool.
    #[must_use]
    pub const fn new(pool: WorklogPgPool) -> Self {
        Self { pool }
    }

    /// Creates the backing relations when absent.
    ///
    /// # Errors
    ///
    /// Returns [`RowStoreError::Unavailable`] when the DDL fails.
    pub async fn initialise_schema(&self) -> RowStoreResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(ROW_STORE_DDL)
                .map_err(RowStoreError::unavailable)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> RowStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RowStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RowStoreError::unavailable)?;
            f(&mut connection)
        })
        .await
        .map_err(RowStoreError::unavailable)?
    }
}

fn table_present(connection: &mut PgConnection, table: TableKind) -> RowStoreResult<bool> {
    let count: i64 = worklog_tables::table
        .filter(worklog_tables::kind.eq(table.as_str()))
        .count()
        .get_result(connection)
        .map_err(RowStoreError::unavailable)?;
    Ok(count > 0)
}

fn require_table(connection: &mut PgConnection, table: TableKind) -> RowStoreResult<()> {
    if table_present(connection, table)? {
        Ok(())
    } else {
        Err(RowStoreError::TableMissing(table))
    }
}

fn row_key(row: RowId) -> RowStoreResult<i64> {
    i64::try_from(row.value()).map_err(RowStoreError::unavailable)
}

#[async_trait]
impl RowStore for PostgresRowStore {
    async fn table_exists(&self, table: TableKind) -> RowStoreResult<bool> {
        self.run_blocking(move |connection| table_present(connection, table))
            .await
    }

    async fn ensure_table(&self, table: TableKind) -> RowStoreResult<bool> {
        self.run_blocking(move |connection| {
            let inserted = diesel::insert_into(worklog_tables::table)
                .values(&NewCatalogRow {
                    kind: table.as_str().to_owned(),
                    created_at: Utc::now(),
                })
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(RowStoreError::unavailable)?;
            Ok(inserted > 0)
        })
        .await
    }

    async fn read_rows(&self, table: TableKind) -> RowStoreResult<Vec<StoredRow>> {
        self.run_blocking(move |connection| {
            require_table(connection, table)?;
            let rows = worklog_rows::table
                .filter(worklog_rows::table_kind.eq(table.as_str()))
                .order(worklog_rows::id.asc())
                .select(EntryRow::as_select())
                .load::<EntryRow>(connection)
                .map_err(RowStoreError::unavailable)?;
            rows.into_iter().map(row_to_stored).collect()
        })
        .await
    }

    async fn append_rows(&self, table: TableKind, entries: &[TaskEntry]) -> RowStoreResult<usize> {
        let new_rows = entries
            .iter()
            .map(|entry| to_new_row(table, entry))
            .collect::<RowStoreResult<Vec<_>>>()?;

        self.run_blocking(move |connection| {
            require_table(connection, table)?;
            if new_rows.is_empty() {
                return Ok(0);
            }
            diesel::insert_into(worklog_rows::table)
                .values(&new_rows)
                .on_conflict((worklog_rows::table_kind, worklog_rows::entry_id))
                .do_nothing()
                .execute(connection)
                .map_err(RowStoreError::unavailable)
        })
        .await
    }

    async fn update_row(
        &self,
        table: TableKind,
        row: RowId,
        entry: &TaskEntry,
    ) -> RowStoreResult<()> {
        let key = row_key(row)?;
        let changes = to_new_row(table, entry)?;

        self.run_blocking(move |connection| {
            require_table(connection, table)?;
            let updated = diesel::update(
                worklog_rows::table
                    .filter(worklog_rows::id.eq(key))
                    .filter(worklog_rows::table_kind.eq(table.as_str())),
            )
            .set(&changes)
            .execute(connection)
            .map_err(RowStoreError::unavailable)?;
            if updated == 0 {
                return Err(RowStoreError::RowNotFound { table, row });
            }
            Ok(())
        })
        .await
    }

    async fn delete_row(&self, table: TableKind, row: RowId) -> RowStoreResult<()> {
        let key = row_key(row)?;
        self.run_blocking(move |connection| {
            require_table(connection, table)?;
            let deleted = diesel::delete(
                worklog_rows::table
                    .filter(worklog_rows::id.eq(key))
                    .filter(worklog_rows::table_kind.eq(table.as_str())),
            )
            .execute(connection)
            .map_err(RowStoreError::unavailable)?;
            if deleted == 0 {
                return Err(RowStoreError::RowNotFound { table, row });
            }
            Ok(())
        })
        .await
    }

    async fn clear(&self, table: TableKind) -> RowStoreResult<usize> {
        self.run_blocking(move |connection| {
            require_table(connection, table)?;
            diesel::delete(worklog_rows::table.filter(worklog_rows::table_kind.eq(table.as_str())))
                .execute(connection)
                .map_err(RowStoreError::unavailable)
        })
        .await
    }
}

pub(super) fn to_new_row(table: TableKind, entry: &TaskEntry) -> RowStoreResult<NewEntryRow> {
    let hours_centi = i32::try_from(entry.hours().centi()).map_err(RowStoreError::unavailable)?;
    Ok(NewEntryRow {
        table_kind: table.as_str().to_owned(),
        entry_id: entry.id().into_inner(),
        entry_date: entry.date(),
        task_name: entry.task_name().as_str().to_owned(),
        description: entry.description_text(),
        hours_centi,
        status: entry.status().to_owned(),
        branch: entry.branch().to_owned(),
        commit_sha: entry.sha().to_owned(),
    })
}

pub(super) fn row_to_stored(row: EntryRow) -> RowStoreResult<StoredRow> {
    let EntryRow {
        id,
        entry_id,
        entry_date,
        task_name,
        description,
        hours_centi,
        status,
        branch,
        commit_sha,
        ..
    } = row;

    let position = u64::try_from(id).map_err(RowStoreError::unavailable)?;
    let centi = u32::try_from(hours_centi).map_err(RowStoreError::unavailable)?;
    let name = TaskName::new(task_name).map_err(RowStoreError::unavailable)?;

    let data = PersistedEntryData {
        id: EntryId::from_uuid(entry_id),
        date: entry_date,
        task_name: name,
        description: split_description(&description),
        hours: Hours::from_centi(centi),
        status,
        branch,
        sha: commit_sha,
    };
    Ok(StoredRow {
        id: RowId::new(position),
        entry: TaskEntry::from_persisted(data),
    })
}
