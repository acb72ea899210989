//! Delivery destinations for log records.
//!
//! # Data Flow
//! ```text
//! Dispatcher
//!     → console.rs (synchronous line on stdout)
//!     → collector.rs (spawned HTTPS POST)
//!         → tls.rs (trust policy → reqwest client)
//!         → failures written straight to the console sink
//! ```
//!
//! # Design Decisions
//! - `Sink::emit` must return promptly; anything slow runs in a spawned task
//! - Sinks receive `Arc<LogRecord>` and can only read it
//! - Collector failures bypass the dispatcher so they cannot re-enter a collector

pub mod collector;
pub mod console;
pub mod tls;

use std::sync::Arc;

use crate::error::SinkError;
use crate::pipeline::{Level, LogRecord};

pub use collector::CollectorSink;
pub use console::ConsoleSink;

/// A delivery destination.
pub trait Sink: Send + Sync {
    /// Label used in diagnostics and metrics.
    fn name(&self) -> &str;

    /// Records below this level are not handed to the sink.
    fn minimum_level(&self) -> Level {
        Level::Debug
    }

    /// Take a record. Must not block on remote I/O.
    fn emit(&self, record: &Arc<LogRecord>) -> Result<(), SinkError>;
}
