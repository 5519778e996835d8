//! Reporting cycle kinds, states and the daily threshold gate.

use super::{Hours, TableKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scheduled reporting cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCycle {
    /// End-of-day report over the daily table.
    Daily,
    /// End-of-week report over the weekly table.
    Weekly,
}

impl ReportCycle {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }

    /// Returns where this cycle's rows come from and where they go.
    #[must_use]
    pub fn rollover_plan(self) -> RolloverPlan {
        match self {
            Self::Daily => RolloverPlan {
                source: TableKind::Daily,
                destinations: vec![TableKind::Weekly, TableKind::Archive],
            },
            Self::Weekly => RolloverPlan {
                source: TableKind::Weekly,
                destinations: vec![TableKind::Archive],
            },
        }
    }
}

impl fmt::Display for ReportCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source and destination tables of one rollover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverPlan {
    /// Table whose rows are copied and then cleared.
    pub source: TableKind,
    /// Tables receiving a copy of every source row, in append order.
    pub destinations: Vec<TableKind>,
}

impl RolloverPlan {
    /// Returns every table the rollover touches, in lock acquisition order.
    #[must_use]
    pub fn tables(&self) -> Vec<TableKind> {
        let mut tables: Vec<TableKind> = self.destinations.clone();
        tables.push(self.source);
        tables.sort_unstable();
        tables.dedup();
        tables
    }
}

/// States a reporting cycle passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    /// Rows are accumulating through the aggregator.
    Pending,
    /// The snapshot is being grouped and checked against the threshold.
    Evaluating,
    /// A report was produced for the mailer.
    Reported,
    /// The report was suppressed.
    Skipped,
    /// Rows were copied downstream and the source cleared.
    RolledOver,
}

impl CycleState {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Evaluating => "evaluating",
            Self::Reported => "reported",
            Self::Skipped => "skipped",
            Self::RolledOver => "rolled_over",
        }
    }
}

/// What happened to a cycle's report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The source table was empty; nothing was reported or rolled over.
    NothingToReport,
    /// The day did not reach the minimum hours; no report was sent.
    BelowThreshold {
        /// Hours recorded for the day.
        total: Hours,
        /// Configured minimum.
        threshold: Hours,
    },
    /// The report was delivered.
    Sent,
    /// Rendering or delivery failed; the rollover still ran.
    Failed {
        /// Failure description.
        reason: String,
    },
}

impl DeliveryOutcome {
    /// Returns the cycle state this outcome leads to.
    #[must_use]
    pub const fn state(&self) -> CycleState {
        match self {
            Self::Sent | Self::Failed { .. } => CycleState::Reported,
            Self::NothingToReport | Self::BelowThreshold { .. } => CycleState::Skipped,
        }
    }
}

/// Minimum-hours gate applied to the daily cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdGate {
    min_daily_hours: Hours,
}

impl ThresholdGate {
    /// Default minimum hours for a daily report.
    pub const DEFAULT_MIN_DAILY_HOURS: Hours = Hours::from_whole(6);

    /// Creates a gate with the given daily minimum.
    #[must_use]
    pub const fn new(min_daily_hours: Hours) -> Self {
        Self { min_daily_hours }
    }

    /// Returns the daily minimum.
    #[must_use]
    pub const fn min_daily_hours(&self) -> Hours {
        self.min_daily_hours
    }

    /// Returns `true` when a report for `total` hours should be sent.
    ///
    /// The weekly cycle is never gated.
    #[must_use]
    pub fn admits(&self, cycle: ReportCycle, total: Hours) -> bool {
        match cycle {
            ReportCycle::Daily => total >= self.min_daily_hours,
            ReportCycle::Weekly => true,
        }
    }
}

impl Default for ThresholdGate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_DAILY_HOURS)
    }
}
