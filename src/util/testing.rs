//! Test logging bootstrap
//!
//! Call [`init_test_setup`] at the top of a test to route tracing output to
//! stderr, honoring `RUST_LOG`. Safe to call from every test; the subscriber
//! is installed once per process.

use std::env;
use std::sync::Once;

use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(setup_test_logging);
}

fn setup_test_logging() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "debug");
    }
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
