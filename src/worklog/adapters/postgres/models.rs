//! Diesel row models for worklog persistence.

use super::schema::{task_registry, worklog_rows, worklog_tables};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

/// Query result row for entry records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = worklog_rows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EntryRow {
    /// Row position.
    pub id: i64,
    /// Logical table.
    pub table_kind: String,
    /// Entry identifier.
    pub entry_id: uuid::Uuid,
    /// Day the entry applies to.
    pub entry_date: NaiveDate,
    /// Task name.
    pub task_name: String,
    /// Newline-joined description.
    pub description: String,
    /// Hours in hundredths.
    pub hours_centi: i32,
    /// Latest status.
    pub status: String,
    /// Retained branch.
    pub branch: String,
    /// Latest commit SHA.
    pub commit_sha: String,
}

/// Insert and update model for entry records.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, AsChangeset)]
#[diesel(table_name = worklog_rows)]
pub struct NewEntryRow {
    /// Logical table.
    pub table_kind: String,
    /// Entry identifier.
    pub entry_id: uuid::Uuid,
    /// Day the entry applies to.
    pub entry_date: NaiveDate,
    /// Task name.
    pub task_name: String,
    /// Newline-joined description.
    pub description: String,
    /// Hours in hundredths.
    pub hours_centi: i32,
    /// Latest status.
    pub status: String,
    /// Retained branch.
    pub branch: String,
    /// Latest commit SHA.
    pub commit_sha: String,
}

/// Insert model for the table catalog.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = worklog_tables)]
pub struct NewCatalogRow {
    /// Logical table.
    pub kind: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query and insert model for registry records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_registry)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RegistryRow {
    /// Task name.
    pub task_name: String,
    /// Last commit timestamp.
    pub last_used: DateTime<Utc>,
}
