//! Application services for commit aggregation and reporting cycles.

pub mod access;
mod aggregator;
mod registry;
mod render;
mod reporting;
mod rollover;

pub use access::{LockTimeout, TableLocks};
pub use aggregator::{
    AggregatorError, AggregatorResult, MergeOutcome, RecordCommitRequest, RecordedCommit,
    TaskAggregator,
};
pub use registry::{RegistryServiceError, RegistryServiceResult, TaskRegistryService};
pub use render::{RenderedReport, ReportRenderError, ReportRenderer, status_colour};
pub use reporting::{
    CycleReport, Recipients, ReportingError, ReportingResult, ReportingService, ReportingSettings,
};
pub use rollover::{DestinationCopy, RolloverError, RolloverManager, RolloverSummary};
