//! Process-wide `tracing` subscriber for hosts that do not install one.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive, e.g. `toodle_core=debug`.
pub const LOG_ENV: &str = "TOODLE_LOG";

const DEFAULT_FILTER: &str = "info";

static LOGGING_INIT: Once = Once::new();

/// Install a stderr subscriber once per process. Later calls are no-ops, and
/// a subscriber already installed by the host is left in place.
pub(crate) fn init(explicit: Option<&str>, configured: Option<&str>) {
    LOGGING_INIT.call_once(|| {
        let env = std::env::var(LOG_ENV).ok();
        let directive = resolve_filter(explicit, env.as_deref(), configured);
        let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_thread_ids(true)
            .with_ansi(false)
            .try_init()
            .is_ok();
        if installed {
            tracing::info!(filter = directive, "toodle logging initialized");
        }
    });
}

/// Pick the first filter set: explicit argument, then `TOODLE_LOG`, then
/// the config file, then the default.
fn resolve_filter<'a>(explicit: Option<&'a str>, env: Option<&'a str>, configured: Option<&'a str>) -> &'a str {
    [explicit, env, configured]
        .into_iter()
        .flatten()
        .find(|f| !f.trim().is_empty())
        .unwrap_or(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        assert_eq!(resolve_filter(Some("trace"), Some("warn"), Some("error")), "trace");
    }

    #[test]
    fn env_beats_config() {
        assert_eq!(resolve_filter(None, Some("warn"), Some("error")), "warn");
    }

    #[test]
    fn blank_values_are_skipped() {
        assert_eq!(resolve_filter(Some("  "), None, Some("debug")), "debug");
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(resolve_filter(None, None, None), DEFAULT_FILTER);
    }

    #[test]
    fn init_twice_is_harmless() {
        init(Some("off"), None);
        init(Some("trace"), None);
    }
}
