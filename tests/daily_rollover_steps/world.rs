//! Shared world state for daily rollover scenarios.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::fixture;
use worklog::{
    app::{App, Backends},
    config::{Config, RecipientList},
    worklog::{
        adapters::memory::{FixedClock, InMemoryRowStore, InMemoryTaskRegistry, RecordingMailer},
        domain::TableKind,
        services::{CycleReport, ReportingError},
    },
};

/// Scenario world for daily rollover behaviour tests.
pub struct RolloverWorld {
    pub app: Option<App>,
    pub store: Arc<InMemoryRowStore>,
    pub mailer: Arc<RecordingMailer>,
    pub last_cycle: Option<Result<CycleReport, ReportingError>>,
}

impl RolloverWorld {
    /// Creates a world with empty tables and no services yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            app: None,
            store: Arc::new(InMemoryRowStore::with_tables([TableKind::Daily])),
            mailer: Arc::new(RecordingMailer::new()),
            last_cycle: None,
        }
    }

    /// Wires the services with a daily threshold of `min_hours`.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is rejected.
    pub fn start(&mut self, min_hours: f64) -> Result<(), eyre::Report> {
        let mut config = Config::default();
        config.reporting.min_hours_threshold = min_hours;
        config.reporting.recipient_email =
            RecipientList::Listed(vec!["lead@example.com".to_owned()]);
        config.schedule.enabled = false;
        let clock = FixedClock::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 23, 55, 0)
                .single()
                .ok_or_else(|| eyre::eyre!("invalid scenario instant"))?,
        );
        let app = App::assemble(
            config.settings()?,
            Backends {
                store: self.store.clone(),
                registry: Arc::new(InMemoryTaskRegistry::new()),
                mailer: self.mailer.clone(),
                clock: Arc::new(clock),
            },
        )?;
        self.app = Some(app);
        Ok(())
    }

    /// Returns the wired services.
    ///
    /// # Errors
    ///
    /// Returns an error when no worklog was started by a given step.
    pub fn app(&self) -> Result<&App, eyre::Report> {
        self.app
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing worklog services in scenario world"))
    }
}

impl Default for RolloverWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> RolloverWorld {
    RolloverWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
