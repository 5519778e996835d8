//! Service wiring: builds adapters from configuration and assembles the
//! aggregator, registry and reporting services around them.

use crate::api::AppState;
use crate::config::{
    Config, ConfigError, MailConfig, MailTransport, Settings, StorageBackend, StorageConfig,
};
use crate::worklog::{
    adapters::{
        mail::{DryRunMailer, HttpRelayMailer},
        memory::{InMemoryRowStore, InMemoryTaskRegistry},
        postgres::{PostgresRowStore, PostgresTaskRegistry, connect_pool},
    },
    domain::TableKind,
    ports::{Mailer, MailerError, RowStore, RowStoreError, TaskRegistry},
    services::{
        ReportRenderError, ReportRenderer, ReportingService, ReportingSettings, TableLocks,
        TaskAggregator, TaskRegistryService,
    },
};
use diesel::r2d2::PoolError;
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Clock shared by every service.
pub type SharedClock = dyn Clock + Send + Sync;

/// Commit aggregator over type-erased adapters.
pub type Aggregator = TaskAggregator<dyn RowStore, dyn TaskRegistry, SharedClock>;

/// Registry management over type-erased adapters.
pub type RegistryManager = TaskRegistryService<dyn TaskRegistry, SharedClock>;

/// Reporting cycles over type-erased adapters.
pub type Reporter = ReportingService<dyn RowStore, dyn Mailer, SharedClock>;

/// Failures while assembling the service graph.
#[derive(Debug, Error)]
pub enum AppBuildError {
    /// Configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The database pool could not be opened.
    #[error("failed to open database pool: {0}")]
    Pool(#[from] PoolError),
    /// Tables could not be provisioned.
    #[error(transparent)]
    Store(#[from] RowStoreError),
    /// The mail transport could not be built.
    #[error(transparent)]
    Mailer(#[from] MailerError),
    /// Report templates failed to compile.
    #[error(transparent)]
    Render(#[from] ReportRenderError),
}

/// Adapters the services run against.
pub struct Backends {
    /// Daily, weekly and archive tables.
    pub store: Arc<dyn RowStore>,
    /// Task registry.
    pub registry: Arc<dyn TaskRegistry>,
    /// Report delivery.
    pub mailer: Arc<dyn Mailer>,
    /// Time source.
    pub clock: Arc<SharedClock>,
}

/// Fully wired services.
pub struct App {
    /// Validated settings the services were built from.
    pub settings: Settings,
    /// Time source shared by the services and the scheduler.
    pub clock: Arc<SharedClock>,
    /// Commit aggregation.
    pub aggregator: Arc<Aggregator>,
    /// Registry management.
    pub registry: Arc<RegistryManager>,
    /// Daily and weekly cycles.
    pub reporting: Arc<Reporter>,
}

impl App {
    /// Builds adapters from `config` and wires the services.
    ///
    /// # Errors
    ///
    /// Returns [`AppBuildError`] when the configuration is invalid or a
    /// backend cannot be opened.
    pub async fn build(config: &Config) -> Result<Self, AppBuildError> {
        let settings = config.settings()?;
        let (store, registry) = open_storage(&config.storage).await?;
        let mailer = open_mailer(&config.mail)?;
        let backends = Backends {
            store,
            registry,
            mailer,
            clock: Arc::new(DefaultClock),
        };
        Ok(Self::assemble(settings, backends)?)
    }

    /// Wires the services around existing adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ReportRenderError`] when the report templates do not
    /// compile.
    pub fn assemble(settings: Settings, backends: Backends) -> Result<Self, ReportRenderError> {
        let Backends {
            store,
            registry,
            mailer,
            clock,
        } = backends;
        let locks = Arc::new(TableLocks::new(settings.lock_timeout));

        let aggregator = TaskAggregator::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            Arc::clone(&clock),
            Arc::clone(&locks),
        )
        .with_policy(settings.merge)
        .with_calendar(settings.calendar)
        .with_operation_timeout(settings.operation_timeout);

        let registry_service = TaskRegistryService::new(registry, Arc::clone(&clock));

        let renderer = ReportRenderer::new(&settings.project_name, settings.signature.clone())?;
        let reporting = ReportingService::new(
            store,
            mailer,
            Arc::clone(&clock),
            locks,
            Arc::new(renderer),
            ReportingSettings {
                gate: settings.gate,
                recipients: settings.recipients.clone(),
                calendar: settings.calendar,
                operation_timeout: settings.operation_timeout,
            },
        );

        Ok(Self {
            settings,
            clock,
            aggregator: Arc::new(aggregator),
            registry: Arc::new(registry_service),
            reporting: Arc::new(reporting),
        })
    }

    /// Returns the HTTP handler state for these services.
    #[must_use]
    pub fn api_state(&self) -> AppState {
        AppState::new(Arc::clone(&self.aggregator), Arc::clone(&self.registry))
    }
}

async fn open_storage(
    storage: &StorageConfig,
) -> Result<(Arc<dyn RowStore>, Arc<dyn TaskRegistry>), AppBuildError> {
    match storage.backend {
        StorageBackend::Memory => {
            tracing::info!("using in-memory storage; rows are lost on exit");
            Ok((
                Arc::new(InMemoryRowStore::with_tables(TableKind::ALL)),
                Arc::new(InMemoryTaskRegistry::new()),
            ))
        }
        StorageBackend::Postgres => {
            let url = storage.database_url.as_deref().ok_or_else(|| ConfigError::Invalid {
                field: "storage.database_url",
                reason: "required for the postgres backend".to_owned(),
            })?;
            let pool = connect_pool(url, storage.pool_size)?;
            let store = PostgresRowStore::new(pool.clone());
            store.initialise_schema().await?;
            for table in TableKind::ALL {
                if store.ensure_table(table).await? {
                    tracing::info!(table = %table, "table created");
                }
            }
            tracing::info!(pool_size = storage.pool_size, "using postgres storage");
            Ok((Arc::new(store), Arc::new(PostgresTaskRegistry::new(pool))))
        }
    }
}

fn open_mailer(mail: &MailConfig) -> Result<Arc<dyn Mailer>, AppBuildError> {
    match mail.transport {
        MailTransport::DryRun => {
            tracing::info!("dry-run mail transport; reports are logged, not sent");
            Ok(Arc::new(DryRunMailer))
        }
        MailTransport::Relay => {
            let endpoint = mail.relay_url.as_deref().ok_or_else(|| ConfigError::Invalid {
                field: "mail.relay_url",
                reason: "required for the relay transport".to_owned(),
            })?;
            let mut relay =
                HttpRelayMailer::new(endpoint, Duration::from_millis(mail.timeout_ms))?;
            if let Some(token) = &mail.api_token {
                relay = relay.with_api_token(token.clone());
            }
            Ok(Arc::new(relay))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worklog::adapters::memory::{FixedClock, RecordingMailer};
    use crate::worklog::services::RecordCommitRequest;
    use chrono::{TimeZone, Utc};

    #[tokio::test(flavor = "multi_thread")]
    async fn default_config_builds_in_memory_services() {
        let config = Config::from_toml("[schedule]\nenabled = false\n").expect("parse");
        let app = App::build(&config).await.expect("build");

        let recorded = app
            .aggregator
            .record_commit(RecordCommitRequest::new("Auth").with_hours(2.0))
            .await
            .expect("record");
        assert_eq!(recorded.entry.task_name().as_str(), "Auth");
        assert_eq!(app.aggregator.list_entries().await.expect("list").len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn assembled_services_share_one_store() {
        let config = Config::from_toml("[schedule]\nenabled = false\n").expect("parse");
        let settings = config.settings().expect("settings");
        let store = Arc::new(InMemoryRowStore::with_tables(TableKind::ALL));
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 18, 0, 0).single().expect("time"),
        ));
        let app = App::assemble(
            settings,
            Backends {
                store: store.clone(),
                registry: Arc::new(InMemoryTaskRegistry::new()),
                mailer: mailer.clone(),
                clock,
            },
        )
        .expect("assemble");

        app.aggregator
            .record_commit(RecordCommitRequest::new("Auth").with_hours(1.0))
            .await
            .expect("record");
        let report = app.reporting.run_daily().await.expect("cycle");

        assert_eq!(report.rows, 1);
        assert!(store.read_rows(TableKind::Daily).await.expect("daily").is_empty());
        assert_eq!(store.read_rows(TableKind::Weekly).await.expect("weekly").len(), 1);
        assert!(mailer.sent().is_empty(), "one hour is below the daily gate");
    }
}
