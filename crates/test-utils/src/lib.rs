// crates/test-utils/src/lib.rs

//! Shared helpers for moodup's integration tests.

pub mod builders;
pub mod scripted;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialise tracing once for the whole test binary. Output goes through
/// the test writer so it only shows up for failing tests.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}
