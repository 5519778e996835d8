//! `worklog` binary: serves the webhook API, runs the reporting scheduler,
//! runs a single cycle on demand, or validates a configuration file.
//!
//! ```text
//! worklog [--config PATH] [--bind ADDR] [--database-url URL] [serve]
//! worklog report daily|weekly
//! worklog check-config
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use worklog::{
    api,
    app::App,
    config::{Config, StorageBackend},
    scheduler::Scheduler,
    telemetry,
    worklog::domain::ReportCycle,
};

const DEFAULT_CONFIG_FILE: &str = "worklog.toml";

#[derive(Debug, Parser)]
#[command(name = "worklog", version, about = "Webhook-driven daily and weekly status reports")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, env = "WORKLOG_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Address to listen on; overrides `server.bind`.
    #[arg(long, env = "WORKLOG_BIND", global = true)]
    bind: Option<String>,

    /// `PostgreSQL` URL; selects the postgres backend.
    #[arg(long, env = "WORKLOG_DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the webhook API and run the scheduler (default).
    Serve,
    /// Run one reporting cycle now and exit.
    Report {
        /// Cycle to run.
        #[arg(value_enum)]
        cycle: CycleArg,
    },
    /// Validate the configuration and exit.
    CheckConfig,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CycleArg {
    Daily,
    Weekly,
}

impl From<CycleArg> for ReportCycle {
    fn from(arg: CycleArg) -> Self {
        match arg {
            CycleArg::Daily => Self::Daily,
            CycleArg::Weekly => Self::Weekly,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init().context("failed to install tracing subscriber")?;
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Report { cycle } => report_once(&config, cycle.into()).await,
        Command::CheckConfig => {
            let settings = config.settings()?;
            tracing::info!(
                project = %settings.project_name,
                offset = %settings.calendar.offset(),
                daily = %settings.daily_schedule,
                weekly = %settings.weekly_schedule,
                schedule_enabled = settings.schedule_enabled,
                "configuration is valid"
            );
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Config::load(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => {
            tracing::info!("no configuration file found; using defaults");
            Config::default()
        }
    };
    if let Some(bind) = &cli.bind {
        config.server.bind.clone_from(bind);
    }
    if let Some(url) = &cli.database_url {
        config.storage.backend = StorageBackend::Postgres;
        config.storage.database_url = Some(url.clone());
    }
    Ok(config)
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let app = App::build(config).await?;
    let shutdown = CancellationToken::new();
    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;

    let scheduler = if app.settings.schedule_enabled {
        let scheduler = Scheduler::new(
            app.reporting.clone(),
            app.clock.clone(),
            app.settings.calendar,
            app.settings.daily_schedule,
            app.settings.weekly_schedule,
        );
        Some(tokio::spawn(scheduler.run(shutdown.clone())))
    } else {
        tracing::info!("scheduler disabled");
        None
    };

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_token.cancel();
    });

    api::serve(listener, api::router(app.api_state()), shutdown.clone()).await?;
    shutdown.cancel();
    if let Some(handle) = scheduler {
        handle.await.context("scheduler task failed")?;
    }
    Ok(())
}

async fn report_once(config: &Config, cycle: ReportCycle) -> anyhow::Result<()> {
    if config.storage.backend == StorageBackend::Memory {
        tracing::warn!("in-memory storage holds no rows outside a running server");
    }
    let app = App::build(config).await?;
    let report = app.reporting.run_cycle(cycle).await?;
    tracing::info!(
        cycle = %cycle,
        run = %report.run_id,
        rows = report.rows,
        total = %report.total_hours,
        outcome = ?report.outcome,
        "cycle completed"
    );
    Ok(())
}

async fn wait_for_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for ctrl-c; stop the process externally");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
