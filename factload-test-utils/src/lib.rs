//! Helpers shared by the test suites of the factload crates.

use std::sync::Once;

use tracing_subscriber::filter::EnvFilter;

/// Filter used when `RUST_LOG` is unset or does not parse: factload's own
/// crates at `debug`, dependencies such as `parquet` at `warn`.
pub const DEFAULT_TEST_FILTER: &str = "warn,factload=debug,factload_stage=debug,factload_fact_writer=debug,factload_keygen=debug";

static INIT: Once = Once::new();

/// Install a `fmt` subscriber writing through the test harness's capture.
/// Safe to call from every test; only the first call has an effect.
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));
        // Stage tests run loads on worker threads; name them in the output.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_names(true)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(feature = "auto-init")]
mod auto {
    #[ctor::ctor]
    fn install_test_subscriber() {
        super::init_tracing_for_tests();
    }
}
