//! Worklog: webhook-driven daily and weekly status reporting.
//!
//! Commit events arrive over HTTP and are merged into one row per task and
//! day. Scheduled cycles group the day's rows into a report, mail it when
//! enough hours were logged, and roll the rows into the weekly and archive
//! tables.
//!
//! # Architecture
//!
//! Worklog follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, mail, memory)
//!
//! # Modules
//!
//! - [`worklog`]: Aggregation, grouping, rollover and reporting cycles
//! - [`api`]: Webhook endpoint
//! - [`app`]: Service wiring from configuration
//! - [`config`]: TOML configuration
//! - [`scheduler`]: Timed daily and weekly cycles
//! - [`telemetry`]: Tracing subscriber setup

pub mod api;
pub mod app;
pub mod config;
pub mod scheduler;
pub mod telemetry;
pub mod worklog;
