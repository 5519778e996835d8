//! Outbound mail adapters.

mod dry_run;
mod relay;

pub use dry_run::DryRunMailer;
pub use relay::HttpRelayMailer;
