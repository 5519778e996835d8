//! Shared fixtures for in-memory integration tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rstest::fixture;
use worklog::{
    app::{App, Backends},
    config::Config,
    worklog::{
        adapters::memory::{FixedClock, InMemoryRowStore, InMemoryTaskRegistry, RecordingMailer},
        domain::{Hours, TableKind},
        ports::RowStore,
    },
};

/// Configuration used by the workday scenarios.
pub const WORKDAY_CONFIG: &str = r#"
project_name = "Atlas"

[reporting]
recipient_email = "lead@example.com, qa@example.com"
cc_daily = ["pm@example.com"]
cc_weekly = ["director@example.com"]
signature = ["Ada"]

[schedule]
enabled = false

[storage]
lock_timeout_ms = 2000
operation_timeout_ms = 2000
"#;

/// Assembled services plus handles on their in-memory adapters.
pub struct Workday {
    /// Wired services.
    pub app: App,
    /// Shared row store.
    pub store: Arc<InMemoryRowStore>,
    /// Mailer recording every report.
    pub mailer: Arc<RecordingMailer>,
    /// Clock driving "today".
    pub clock: Arc<FixedClock>,
}

impl Workday {
    /// Wires the services from `config` with the clock frozen at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration or templates are invalid.
    pub fn start(config: &str, now: DateTime<Utc>) -> Result<Self, eyre::Report> {
        let settings = Config::from_toml(config)?.settings()?;
        let store = Arc::new(InMemoryRowStore::with_tables([TableKind::Daily]));
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(FixedClock::new(now));
        let app = App::assemble(
            settings,
            Backends {
                store: store.clone(),
                registry: Arc::new(InMemoryTaskRegistry::new()),
                mailer: mailer.clone(),
                clock: clock.clone(),
            },
        )?;
        Ok(Self {
            app,
            store,
            mailer,
            clock,
        })
    }

    /// Sums the hours held in `table`, treating a missing table as empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the table cannot be read.
    pub async fn hours_in(&self, table: TableKind) -> Result<Hours, eyre::Report> {
        if !self.store.table_exists(table).await? {
            return Ok(Hours::ZERO);
        }
        let rows = self.store.read_rows(table).await?;
        Ok(rows.iter().map(|row| row.entry.hours()).sum())
    }

    /// Counts the rows held in `table`, treating a missing table as empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the table cannot be read.
    pub async fn rows_in(&self, table: TableKind) -> Result<usize, eyre::Report> {
        if !self.store.table_exists(table).await? {
            return Ok(0);
        }
        Ok(self.store.read_rows(table).await?.len())
    }
}

/// Builds a UTC instant.
///
/// # Panics
///
/// Panics when the components do not form a valid instant.
#[must_use]
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid instant")
}

/// Provides services for Monday 2 March 2026, 09:00 UTC.
#[fixture]
pub fn workday() -> Workday {
    Workday::start(WORKDAY_CONFIG, at(2026, 3, 2, 9, 0)).expect("workday services")
}
