//! Domain model for commit aggregation and status reporting.
//!
//! The worklog domain models daily task entries, the merge policy applied
//! to inbound commits, report grouping, and the reporting cycle state
//! machine while keeping storage, mail and HTTP concerns outside of the
//! domain boundary.

mod calendar;
mod cycle;
mod entry;
mod error;
mod hours;
mod ids;
mod policy;
mod registry;
mod schedule;
mod summary;
mod table;

pub use calendar::{ReportCalendar, format_day};
pub use cycle::{CycleState, DeliveryOutcome, ReportCycle, RolloverPlan, ThresholdGate};
pub use entry::{
    CommitEvent, DEFAULT_HOURS, DEFAULT_SHA, DEFAULT_STATUS, PersistedEntryData, TaskEntry,
    split_description,
};
pub use error::{ParseScheduleError, ParseTableKindError, WorklogDomainError};
pub use hours::Hours;
pub use ids::{CycleRunId, EntryId, TaskName};
pub use policy::{BranchRetention, MergePolicy, TaskNameMatching};
pub use registry::{RegistryEntry, sort_by_recency};
pub use schedule::CycleSchedule;
pub use summary::{GroupedReport, TaskSummary};
pub use table::{ENTRY_COLUMNS, REGISTRY_COLUMNS, TableKind};
