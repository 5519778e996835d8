//! Commit aggregation and status reporting.
//!
//! Inbound commit events are merged into one row per task and day in the
//! daily table. Reporting cycles group a table snapshot into per-task
//! summaries, mail a report when the day carries enough hours, and roll the
//! rows forward into the weekly and archive tables. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
