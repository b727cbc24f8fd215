//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Used when the configured filter does not parse.
const FALLBACK_FILTER: &str = "webtest=info";

/// Install a global `fmt` subscriber filtered by `filter` (`RUST_LOG` syntax).
///
/// Output goes through the test writer, so it is captured per test. Safe to
/// call more than once; returns `false` when a subscriber was already set.
/// An invalid `filter` is replaced by `webtest=info` and reported with
/// `warn!`.
pub fn init_tracing(filter: &str) -> bool {
    let (env_filter, rejected) = resolve_filter(filter);
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init()
        .is_ok();
    if let Some(err) = rejected {
        tracing::warn!(filter, error = %err, fallback = FALLBACK_FILTER, "invalid log filter");
    }
    installed
}

/// The filter to install, and why `filter` was rejected if it was.
fn resolve_filter(filter: &str) -> (EnvFilter, Option<ParseError>) {
    match EnvFilter::try_new(filter) {
        Ok(env_filter) => (env_filter, None),
        Err(err) => (EnvFilter::new(FALLBACK_FILTER), Some(err)),
    }
}
