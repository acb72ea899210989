//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → wait_for_signal resolves
//!
//! Shutdown (shutdown.rs):
//!     drain → trigger → HTTP server stops accepting and drains
//!             → LoggerPipeline::shutdown(grace) drains log deliveries
//!             → exit
//! ```
//!
//! # Design Decisions
//! - The pipeline is drained last so records logged while draining HTTP still ship
//! - Every wait is bounded: the log drain has a grace period, requests a timeout

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
