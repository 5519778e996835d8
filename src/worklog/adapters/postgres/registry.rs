//! `PostgreSQL` task registry implementation.

use super::{
    WorklogPgPool,
    models::RegistryRow,
    schema::{REGISTRY_DDL, task_registry},
};
use crate::worklog::{
    domain::{RegistryEntry, TaskName},
    ports::{RegistryError, RegistryResult, TaskRegistry},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::upsert::excluded;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// `PostgreSQL`-backed task registry.
///
/// The `task_registry` relation is created by the first operation.
#[derive(Debug, Clone)]
pub struct PostgresTaskRegistry {
    pool: WorklogPgPool,
    provisioned: Arc<AtomicBool>,
}

impl PostgresTaskRegistry {
    /// Creates a registry from a connection pool.
    #[must_use]
    pub fn new(pool: WorklogPgPool) -> Self {
        Self {
            pool,
            provisioned: Arc::new(AtomicBool::new(false)),
        }
    }

    async fn run_blocking<F, T>(&self, f: F) -> RegistryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RegistryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let provisioned = Arc::clone(&self.provisioned);
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RegistryError::unavailable)?;
            if !provisioned.load(Ordering::Acquire) {
                connection
                    .batch_execute(REGISTRY_DDL)
                    .map_err(RegistryError::unavailable)?;
                provisioned.store(true, Ordering::Release);
            }
            f(&mut connection)
        })
        .await
        .map_err(RegistryError::unavailable)?
    }
}

fn map_write_error(err: DieselError, duplicate: &TaskName) -> RegistryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            RegistryError::DuplicateTask(duplicate.clone())
        }
        other => RegistryError::unavailable(other),
    }
}

#[async_trait]
impl TaskRegistry for PostgresTaskRegistry {
    async fn touch(&self, task_name: &TaskName, at: DateTime<Utc>) -> RegistryResult<()> {
        let row = RegistryRow {
            task_name: task_name.as_str().to_owned(),
            last_used: at,
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(task_registry::table)
                .values(&row)
                .on_conflict(task_registry::task_name)
                .do_update()
                .set(task_registry::last_used.eq(excluded(task_registry::last_used)))
                .execute(connection)
                .map_err(RegistryError::unavailable)?;
            Ok(())
        })
        .await
    }

    async fn create(&self, entry: &RegistryEntry) -> RegistryResult<()> {
        let name = entry.task_name().clone();
        let row = RegistryRow {
            task_name: name.as_str().to_owned(),
            last_used: entry.last_used(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(task_registry::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_write_error(err, &name))?;
            Ok(())
        })
        .await
    }

    async fn rename(&self, from: &TaskName, to: &TaskName) -> RegistryResult<()> {
        let source = from.clone();
        let target = to.clone();
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                task_registry::table.filter(task_registry::task_name.eq(source.as_str())),
            )
            .set(task_registry::task_name.eq(target.as_str()))
            .execute(connection)
            .map_err(|err| map_write_error(err, &target))?;
            if updated == 0 {
                return Err(RegistryError::NotFound(source));
            }
            Ok(())
        })
        .await
    }

    async fn remove(&self, task_name: &TaskName) -> RegistryResult<()> {
        let name = task_name.clone();
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                task_registry::table.filter(task_registry::task_name.eq(name.as_str())),
            )
            .execute(connection)
            .map_err(RegistryError::unavailable)?;
            if deleted == 0 {
                return Err(RegistryError::NotFound(name));
            }
            Ok(())
        })
        .await
    }

    async fn list(&self) -> RegistryResult<Vec<RegistryEntry>> {
        self.run_blocking(|connection| {
            let rows = task_registry::table
                .select(RegistryRow::as_select())
                .load::<RegistryRow>(connection)
                .map_err(RegistryError::unavailable)?;
            rows.into_iter()
                .map(|row| {
                    TaskName::new(row.task_name)
                        .map(|name| RegistryEntry::new(name, row.last_used))
                        .map_err(RegistryError::unavailable)
                })
                .collect()
        })
        .await
    }
}
