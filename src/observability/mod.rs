//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline and host produce:
//!     → logging.rs (tracing diagnostics on stderr)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Operator terminal / process supervisor (stderr)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - This is about the relay's own health, not the records it ships
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
