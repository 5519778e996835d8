//! `PostgreSQL` adapters for worklog persistence.

mod models;
mod registry;
mod row_store;
mod schema;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};

pub use registry::PostgresTaskRegistry;
pub use row_store::PostgresRowStore;

/// `PostgreSQL` connection pool type used by worklog adapters.
pub type WorklogPgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`PoolError`] when the initial connections cannot be opened.
pub fn connect_pool(database_url: &str, max_size: u32) -> Result<WorklogPgPool, PoolError> {
    Pool::builder()
        .max_size(max_size)
        .build(ConnectionManager::<PgConnection>::new(database_url))
}
