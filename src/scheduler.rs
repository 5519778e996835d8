//! Fires the daily and weekly reporting cycles on their schedules.

use crate::app::{Reporter, SharedClock};
use crate::worklog::domain::{CycleSchedule, ReportCalendar, ReportCycle};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Next fire instant of each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpcomingRuns {
    /// Next daily cycle.
    pub daily: DateTime<Utc>,
    /// Next weekly cycle.
    pub weekly: DateTime<Utc>,
}

impl UpcomingRuns {
    /// Returns the cycle due first. The daily cycle wins a tie so that its
    /// rows reach the weekly table before the weekly cycle reads it.
    #[must_use]
    pub fn earliest(&self) -> (ReportCycle, DateTime<Utc>) {
        if self.daily <= self.weekly {
            (ReportCycle::Daily, self.daily)
        } else {
            (ReportCycle::Weekly, self.weekly)
        }
    }
}

/// Runs reporting cycles until cancelled.
pub struct Scheduler {
    reporting: Arc<Reporter>,
    clock: Arc<SharedClock>,
    calendar: ReportCalendar,
    daily: CycleSchedule,
    weekly: CycleSchedule,
}

impl Scheduler {
    /// Creates a scheduler over `reporting`.
    #[must_use]
    pub const fn new(
        reporting: Arc<Reporter>,
        clock: Arc<SharedClock>,
        calendar: ReportCalendar,
        daily: CycleSchedule,
        weekly: CycleSchedule,
    ) -> Self {
        Self {
            reporting,
            clock,
            calendar,
            daily,
            weekly,
        }
    }

    /// Computes the first fire instants strictly after `now`.
    #[must_use]
    pub fn upcoming(&self, now: DateTime<Utc>) -> UpcomingRuns {
        UpcomingRuns {
            daily: self.daily.next_after(now, &self.calendar),
            weekly: self.weekly.next_after(now, &self.calendar),
        }
    }

    /// Sleeps until each cycle is due and runs it, until `shutdown` fires.
    ///
    /// Cycle failures are logged; the schedule continues with the next
    /// fire instant. Shutdown is only observed between cycles: a cycle that
    /// has started always runs to completion, delivery included.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut upcoming = self.upcoming(self.clock.utc());
        tracing::info!(
            daily = %upcoming.daily,
            weekly = %upcoming.weekly,
            "scheduler started"
        );

        loop {
            let (cycle, due) = upcoming.earliest();
            let wait = (due - self.clock.utc()).to_std().unwrap_or(Duration::ZERO);
            tracing::debug!(
                cycle = %cycle,
                due = %due,
                wait_secs = wait.as_secs(),
                "waiting for next cycle"
            );

            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(wait) => {}
            }

            self.fire(cycle).await;
            match cycle {
                ReportCycle::Daily => upcoming.daily = self.daily.next_after(due, &self.calendar),
                ReportCycle::Weekly => {
                    upcoming.weekly = self.weekly.next_after(due, &self.calendar);
                }
            }
        }
        tracing::info!("scheduler stopped");
    }

    async fn fire(&self, cycle: ReportCycle) {
        match self.reporting.run_cycle(cycle).await {
            Ok(report) => tracing::info!(
                cycle = %cycle,
                run = %report.run_id,
                rows = report.rows,
                total = %report.total_hours,
                outcome = ?report.outcome,
                "scheduled cycle completed"
            ),
            Err(err) => tracing::error!(
                cycle = %cycle,
                error = %err,
                retryable = err.is_retryable(),
                "scheduled cycle failed"
            ),
        }
    }
}
