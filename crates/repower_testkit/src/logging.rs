//! Test logging setup.

use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber writing to the test harness.
///
/// Honors `RUST_LOG`, defaulting to `debug` for repower crates. Safe to call
/// from every test; only the first call installs anything.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("repower_core=debug,repower_remote=debug,repower_project=debug")
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
