//! Reporting cycles: snapshot, group, gate, render and roll over under the
//! table locks, then deliver.

use super::{
    access::{DEFAULT_OPERATION_TIMEOUT, LockTimeout, TableLocks, bounded},
    render::{RenderedReport, ReportRenderer},
    rollover::{RolloverError, RolloverManager, RolloverSummary},
};
use crate::worklog::{
    domain::{
        CycleRunId, CycleState, DeliveryOutcome, GroupedReport, Hours, ReportCalendar,
        ReportCycle, TableKind, TaskEntry, ThresholdGate,
    },
    ports::{Mailer, OutgoingMail, RowStore, RowStoreError},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::Instrument;

/// Who receives each cycle's report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipients {
    /// Primary recipients of both reports.
    pub to: Vec<String>,
    /// CC list of the daily report.
    pub daily_cc: Vec<String>,
    /// CC list of the weekly report.
    pub weekly_cc: Vec<String>,
    /// When set, every report goes only to this address, without CC.
    pub debug_recipient: Option<String>,
}

impl Recipients {
    /// Returns `(to, cc)` for `cycle`.
    #[must_use]
    pub fn for_cycle(&self, cycle: ReportCycle) -> (Vec<String>, Vec<String>) {
        if let Some(debug) = &self.debug_recipient {
            return (vec![debug.clone()], Vec::new());
        }
        let cc = match cycle {
            ReportCycle::Daily => self.daily_cc.clone(),
            ReportCycle::Weekly => self.weekly_cc.clone(),
        };
        (self.to.clone(), cc)
    }
}

/// Settings shared by both cycles.
#[derive(Debug, Clone)]
pub struct ReportingSettings {
    /// Daily minimum-hours gate.
    pub gate: ThresholdGate,
    /// Report recipients.
    pub recipients: Recipients,
    /// Calendar used to date the daily report.
    pub calendar: ReportCalendar,
    /// Bound applied to each row store call.
    pub operation_timeout: Duration,
}

impl Default for ReportingSettings {
    fn default() -> Self {
        Self {
            gate: ThresholdGate::default(),
            recipients: Recipients::default(),
            calendar: ReportCalendar::utc(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

/// Record of one cycle run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Correlation id of the run.
    pub run_id: CycleRunId,
    /// Which cycle ran.
    pub cycle: ReportCycle,
    /// States visited, in order.
    pub states: Vec<CycleState>,
    /// Hours in the source snapshot.
    pub total_hours: Hours,
    /// Rows in the source snapshot.
    pub rows: usize,
    /// What happened to the report.
    pub outcome: DeliveryOutcome,
    /// Rollover result; `None` when the source was empty.
    pub rollover: Option<RolloverSummary>,
}

/// Cycle failures that prevented the rollover.
#[derive(Debug, Error)]
pub enum ReportingError {
    /// Table locks were not acquired in time.
    #[error(transparent)]
    Lock(#[from] LockTimeout),
    /// The source snapshot could not be read.
    #[error(transparent)]
    Store(#[from] RowStoreError),
    /// The report was evaluated but the rollover failed.
    #[error("{source} (report outcome: {delivery:?})")]
    Rollover {
        /// Report outcome reached before the rollover.
        delivery: DeliveryOutcome,
        /// Rollover failure.
        source: RolloverError,
    },
}

impl ReportingError {
    /// Returns `true` when re-running the cycle may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Lock(_) => true,
            Self::Store(err) => err.is_retryable(),
            Self::Rollover { source, .. } => source.is_retryable(),
        }
    }
}

/// Result type for reporting cycles.
pub type ReportingResult<T> = Result<T, ReportingError>;

/// Report decision taken under the table locks.
enum PendingReport {
    Ready(RenderedReport),
    Unrendered(String),
    Gated(DeliveryOutcome),
}

/// Result of the locked phase of a non-empty cycle.
struct EvaluatedCycle {
    rows: usize,
    total_hours: Hours,
    report: PendingReport,
    rollover: Result<RolloverSummary, RolloverError>,
}

/// Runs daily and weekly reporting cycles.
pub struct ReportingService<S, M, C>
where
    S: RowStore + ?Sized,
    M: Mailer + ?Sized,
    C: Clock + Send + Sync + ?Sized,
{
    store: Arc<S>,
    mailer: Arc<M>,
    clock: Arc<C>,
    locks: Arc<TableLocks>,
    renderer: Arc<ReportRenderer>,
    rollover: RolloverManager<S>,
    settings: ReportingSettings,
}

impl<S, M, C> ReportingService<S, M, C>
where
    S: RowStore + ?Sized,
    M: Mailer + ?Sized,
    C: Clock + Send + Sync + ?Sized,
{
    /// Creates a reporting service.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        mailer: Arc<M>,
        clock: Arc<C>,
        locks: Arc<TableLocks>,
        renderer: Arc<ReportRenderer>,
        settings: ReportingSettings,
    ) -> Self {
        let rollover = RolloverManager::new(Arc::clone(&store))
            .with_operation_timeout(settings.operation_timeout);
        Self {
            store,
            mailer,
            clock,
            locks,
            renderer,
            rollover,
            settings,
        }
    }

    /// Runs the end-of-day cycle over the daily table.
    ///
    /// # Errors
    ///
    /// See [`Self::run_cycle`].
    pub async fn run_daily(&self) -> ReportingResult<CycleReport> {
        self.run_cycle(ReportCycle::Daily).await
    }

    /// Runs the end-of-week cycle over the weekly table.
    ///
    /// # Errors
    ///
    /// See [`Self::run_cycle`].
    pub async fn run_weekly(&self) -> ReportingResult<CycleReport> {
        self.run_cycle(ReportCycle::Weekly).await
    }

    /// Runs one cycle.
    ///
    /// The snapshot, threshold check, rendering and rollover happen while
    /// the locks of every table the cycle touches are held. The rendered
    /// report is handed to the mailer only after the locks are released,
    /// so slow delivery never stalls inbound commits.
    ///
    /// An empty source ends the cycle with
    /// [`DeliveryOutcome::NothingToReport`] and no rollover. Otherwise the
    /// rows roll over whether the report was sent, gated or failed.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::Lock`] when the tables stay busy,
    /// [`ReportingError::Store`] when the source is missing or unreadable,
    /// and [`ReportingError::Rollover`] when copying or clearing fails.
    pub async fn run_cycle(&self, cycle: ReportCycle) -> ReportingResult<CycleReport> {
        let run_id = CycleRunId::new();
        let span = tracing::info_span!("report_cycle", cycle = %cycle, run = %run_id);
        self.run_cycle_inner(cycle, run_id).instrument(span).await
    }

    async fn run_cycle_inner(
        &self,
        cycle: ReportCycle,
        run_id: CycleRunId,
    ) -> ReportingResult<CycleReport> {
        let mut states = vec![CycleState::Pending, CycleState::Evaluating];

        let Some(evaluated) = self.evaluate_and_roll_over(cycle).await? else {
            tracing::info!("source table empty; nothing to report");
            let outcome = DeliveryOutcome::NothingToReport;
            states.push(outcome.state());
            states.push(CycleState::Pending);
            return Ok(CycleReport {
                run_id,
                cycle,
                states,
                total_hours: Hours::ZERO,
                rows: 0,
                outcome,
                rollover: None,
            });
        };

        let outcome = match evaluated.report {
            PendingReport::Ready(rendered) => self.deliver(cycle, rendered).await,
            PendingReport::Unrendered(reason) => DeliveryOutcome::Failed { reason },
            PendingReport::Gated(gated) => gated,
        };
        states.push(outcome.state());

        let summary = match evaluated.rollover {
            Ok(summary) => summary,
            Err(source) => {
                return Err(ReportingError::Rollover {
                    delivery: outcome,
                    source,
                });
            }
        };
        states.push(CycleState::RolledOver);
        states.push(CycleState::Pending);

        tracing::info!(
            rows = evaluated.rows,
            total = %evaluated.total_hours,
            outcome = ?outcome,
            "reporting cycle finished"
        );
        Ok(CycleReport {
            run_id,
            cycle,
            states,
            total_hours: evaluated.total_hours,
            rows: evaluated.rows,
            outcome,
            rollover: Some(summary),
        })
    }

    /// Locked phase of a cycle; `None` when the source table is empty.
    async fn evaluate_and_roll_over(
        &self,
        cycle: ReportCycle,
    ) -> ReportingResult<Option<EvaluatedCycle>> {
        let plan = cycle.rollover_plan();
        let _held = self.locks.write(&plan.tables()).await?;

        let snapshot = self.snapshot(plan.source).await?;
        if snapshot.is_empty() {
            return Ok(None);
        }
        let today = self.settings.calendar.date_of(self.clock.utc());

        let grouped = GroupedReport::from_entries(&snapshot);
        let total_hours = grouped.total_hours();
        let report = if self.settings.gate.admits(cycle, total_hours) {
            self.render(cycle, &grouped, today)
        } else {
            tracing::info!(
                total = %total_hours,
                threshold = %self.settings.gate.min_daily_hours(),
                "below daily threshold; report not sent"
            );
            PendingReport::Gated(DeliveryOutcome::BelowThreshold {
                total: total_hours,
                threshold: self.settings.gate.min_daily_hours(),
            })
        };

        let rollover = self.rollover.roll_over(&plan, &snapshot).await;
        Ok(Some(EvaluatedCycle {
            rows: snapshot.len(),
            total_hours,
            report,
            rollover,
        }))
    }

    async fn snapshot(&self, table: TableKind) -> ReportingResult<Vec<TaskEntry>> {
        let timeout = self.settings.operation_timeout;
        let exists = bounded("table_exists", table, timeout, self.store.table_exists(table)).await?;
        if !exists {
            return Err(RowStoreError::TableMissing(table).into());
        }
        let rows = bounded("read_rows", table, timeout, self.store.read_rows(table)).await?;
        Ok(rows.into_iter().map(|row| row.entry).collect())
    }

    fn render(
        &self,
        cycle: ReportCycle,
        grouped: &GroupedReport,
        today: NaiveDate,
    ) -> PendingReport {
        let rendered = match cycle {
            ReportCycle::Daily => self.renderer.render_daily(grouped, today),
            ReportCycle::Weekly => self.renderer.render_weekly(grouped, today),
        };
        match rendered {
            Ok(report) => PendingReport::Ready(report),
            Err(err) => {
                tracing::error!(error = %err, "report rendering failed");
                PendingReport::Unrendered(err.to_string())
            }
        }
    }

    async fn deliver(&self, cycle: ReportCycle, report: RenderedReport) -> DeliveryOutcome {
        let RenderedReport { subject, html_body } = report;
        let (to, cc) = self.settings.recipients.for_cycle(cycle);
        let mail = OutgoingMail::new(to, subject, html_body).with_cc(cc);
        match self.mailer.send(&mail).await {
            Ok(()) => {
                tracing::info!(subject = mail.subject(), "report sent");
                DeliveryOutcome::Sent
            }
            Err(err) => {
                tracing::error!(error = %err, "report delivery failed");
                DeliveryOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}
