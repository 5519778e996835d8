//! Step definitions for daily rollover scenarios.

mod given;
mod then;
mod when;
pub mod world;
