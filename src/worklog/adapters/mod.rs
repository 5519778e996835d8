//! Adapter implementations for worklog ports.

pub mod mail;
pub mod memory;
pub mod postgres;
