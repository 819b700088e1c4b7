//! Process-wide tracing setup shared by every binary in the workspace.

/// Initialize tracing for the process.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    let _ = tracing::init();
}

/// Subscriber configuration (filter, JSON layer).
pub mod tracing;
