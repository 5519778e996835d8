//! Tracing subscriber setup for the `worklog` binary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*, util::TryInitError};

/// Filter applied when `RUST_LOG` is unset, empty or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Builds the level filter from a raw `RUST_LOG` value.
///
/// Blank, oversized or unparseable directives fall back to
/// [`DEFAULT_FILTER`] so a bad environment never stops the service.
#[must_use]
pub fn filter_from(raw: Option<&str>) -> EnvFilter {
    raw.map(str::trim)
        .filter(|directives| !directives.is_empty() && directives.len() <= 4096)
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber: `RUST_LOG` filter plus the fmt layer.
///
/// # Errors
///
/// Returns [`TryInitError`] when a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    let raw = std::env::var("RUST_LOG").ok();
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter_from(raw.as_deref()))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unset(None, "info")]
    #[case::blank(Some("   "), "info")]
    #[case::valid(Some("worklog=debug"), "worklog=debug")]
    fn filter_falls_back_to_info(#[case] raw: Option<&str>, #[case] expected: &str) {
        assert_eq!(filter_from(raw).to_string(), expected);
    }
}
