//! Diagnostics for the process itself.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber for lifecycle and error diagnostics
//! - Keep stdout free for the console sink
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - Diagnostics go to stderr; pipeline output never flows through `tracing`
//!   and `tracing` never flows into the pipeline, so neither can recurse

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("trace_log_relay={},tower_http={}", log_level, log_level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
