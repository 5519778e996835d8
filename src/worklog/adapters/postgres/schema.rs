//! Diesel schema for worklog persistence.

diesel::table! {
    /// Catalog of logical tables that have been created.
    worklog_tables (kind) {
        /// Logical table name (`daily`, `weekly`, `archive`).
        #[max_length = 16]
        kind -> Varchar,
        /// When the table was created.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Data rows of every logical entry table.
    worklog_rows (id) {
        /// Insertion-ordered row position.
        id -> Int8,
        /// Logical table the row belongs to.
        #[max_length = 16]
        table_kind -> Varchar,
        /// Entry identifier, unique per logical table.
        entry_id -> Uuid,
        /// Day the entry applies to.
        entry_date -> Date,
        /// Task name.
        task_name -> Text,
        /// Newline-joined description lines.
        description -> Text,
        /// Hours in hundredths.
        hours_centi -> Int4,
        /// Latest status.
        status -> Text,
        /// Retained branch.
        branch -> Text,
        /// Latest commit SHA.
        commit_sha -> Text,
    }
}

diesel::table! {
    /// Recency index of known task names.
    task_registry (task_name) {
        /// Task name.
        task_name -> Text,
        /// Last commit timestamp.
        last_used -> Timestamptz,
    }
}

/// DDL for the entry tables; idempotent.
pub(super) const ROW_STORE_DDL: &str = concat!(
    "CREATE TABLE IF NOT EXISTS worklog_tables (",
    "kind VARCHAR(16) PRIMARY KEY, ",
    "created_at TIMESTAMPTZ NOT NULL DEFAULT now());",
    "CREATE TABLE IF NOT EXISTS worklog_rows (",
    "id BIGSERIAL PRIMARY KEY, ",
    "table_kind VARCHAR(16) NOT NULL REFERENCES worklog_tables(kind), ",
    "entry_id UUID NOT NULL, ",
    "entry_date DATE NOT NULL, ",
    "task_name TEXT NOT NULL, ",
    "description TEXT NOT NULL DEFAULT '', ",
    "hours_centi INTEGER NOT NULL CHECK (hours_centi >= 0), ",
    "status TEXT NOT NULL, ",
    "branch TEXT NOT NULL DEFAULT '', ",
    "commit_sha TEXT NOT NULL);",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_worklog_rows_table_entry ",
    "ON worklog_rows (table_kind, entry_id);",
);

/// DDL for the task registry; idempotent.
pub(super) const REGISTRY_DDL: &str = concat!(
    "CREATE TABLE IF NOT EXISTS task_registry (",
    "task_name TEXT PRIMARY KEY, ",
    "last_used TIMESTAMPTZ NOT NULL);",
);
