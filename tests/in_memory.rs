//! In-memory integration tests for the assembled worklog services.
//!
//! Tests are organized into modules by functionality:
//! - `workday_flow_tests`: Webhook commits through daily and weekly cycles
//! - `concurrency_tests`: Concurrent commits and cycles against one store

mod in_memory {
    pub mod helpers;

    mod concurrency_tests;
    mod workday_flow_tests;
}
