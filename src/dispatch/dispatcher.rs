//! Fan-out of records to every configured sink.
//!
//! # Responsibilities
//! - Hand each record to every sink whose level floor it meets
//! - Contain sink failures: an `Err` or a panic from one sink never reaches
//!   the caller and never stops the remaining sinks
//! - Report contained failures on the console diagnostics channel

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::SinkError;
use crate::observability::metrics::{self, SinkOutcome};
use crate::pipeline::{Args, LogRecord};
use crate::sinks::{ConsoleSink, Sink};

/// Routes finished records to sinks.
pub struct Dispatcher {
    sinks: Vec<Arc<dyn Sink>>,
    diagnostics: Arc<ConsoleSink>,
}

impl Dispatcher {
    pub fn new(sinks: Vec<Arc<dyn Sink>>, diagnostics: Arc<ConsoleSink>) -> Self {
        Self { sinks, diagnostics }
    }

    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }

    pub fn diagnostics(&self) -> &Arc<ConsoleSink> {
        &self.diagnostics
    }

    /// Deliver `record` to every interested sink and hand it back.
    ///
    /// Never fails and never panics.
    pub fn dispatch(&self, record: LogRecord) -> Arc<LogRecord> {
        let record = Arc::new(record);

        for sink in &self.sinks {
            if record.level() < sink.minimum_level() {
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| sink.emit(&record))) {
                Ok(Ok(())) => {}
                Ok(Err(SinkError::Saturated { limit })) => {
                    metrics::record_sink_outcome(sink.name(), SinkOutcome::Dropped);
                    self.diagnostics.warn(
                        "Log record dropped by {Sink}: {Limit} deliveries already in flight",
                        Args::new().with("Sink", sink.name()).with("Limit", limit),
                    );
                }
                Ok(Err(e)) => {
                    metrics::record_sink_outcome(sink.name(), SinkOutcome::Failed);
                    self.diagnostics.warn(
                        "Log sink {Sink} failed: {Error}",
                        Args::new()
                            .with("Sink", sink.name())
                            .with("Error", e.to_string()),
                    );
                }
                Err(panic) => {
                    metrics::record_sink_outcome(sink.name(), SinkOutcome::Panicked);
                    self.diagnostics.warn(
                        "Log sink {Sink} panicked: {Error}",
                        Args::new()
                            .with("Sink", sink.name())
                            .with("Error", panic_message(panic.as_ref())),
                    );
                }
            }
        }

        record
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field(
                "sinks",
                &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
