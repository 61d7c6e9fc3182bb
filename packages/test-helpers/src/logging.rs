//! Logging setup for tests.
use std::sync::Once;

use tracing::level_filters::LevelFilter;

static INIT: Once = Once::new();

/// Installs a global `tracing` subscriber that writes to the test output.
///
/// It can be called from every test; only the first call installs it.
pub fn setup() {
    setup_with_level(LevelFilter::TRACE);
}

pub fn setup_with_level(level: LevelFilter) {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_ansi(false)
            .init();

        tracing::info!("Logging initialized");
    });
}
