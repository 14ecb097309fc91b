//! Tracing subscriber initialization.
//!
//! ```no_run
//! bakery_recommend::telemetry::init_tracing();
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Install a structured `fmt` subscriber filtered by `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already set; calling it more
/// than once is harmless.
pub fn init_tracing() -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        init_tracing();
        assert!(!init_tracing());
    }
}
