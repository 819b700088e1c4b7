//! JSON log output filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Build the filter from `RUST_LOG`, falling back to `default_directive`.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install the global JSON subscriber.
///
/// Returns `false` if a subscriber was already installed (e.g. by a test
/// harness), in which case nothing changes.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(DEFAULT_DIRECTIVE))
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        let _ = init();
        assert!(!init());
    }
}
