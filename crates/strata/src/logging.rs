//! Log subscriber setup for STRATA binaries.
//!
//! Library crates only emit `tracing` events. A host that wants them on the
//! console calls [`init_logging`] once at startup:
//!
//! ```no_run
//! strata::logging::init_logging(Some("info,strata_world=debug"));
//! ```
//!
//! `RUST_LOG` always wins over the filter passed in.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor a configured level is given.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber.
///
/// Returns `false` if a subscriber was already installed, which is harmless
/// (tests and embedding hosts commonly install their own).
pub fn init_logging(filter: Option<&str>) -> bool {
    let fallback = filter.unwrap_or(DEFAULT_FILTER);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // Workers are named, so thread names are worth printing
    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init()
        .is_ok()
}

/// The default filter as an [`EnvFilter`].
#[must_use]
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(default_env_filter().to_string().contains("info"));
    }

    #[test]
    fn test_subsystem_filter() {
        let filter = EnvFilter::new("info,strata_world=debug");
        let rendered = filter.to_string();
        assert!(rendered.contains("strata_world=debug"));
    }

    #[test]
    fn test_second_init_is_harmless() {
        init_logging(Some("warn"));
        assert!(!init_logging(Some("warn")));
    }
}
