//! Unit tests for the worklog module.

mod grouper_tests;
mod memory_store_tests;
mod rollover_tests;
mod support;
