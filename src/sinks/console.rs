//! Console sink.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::error::SinkError;
use crate::observability::metrics::{self, SinkOutcome};
use crate::pipeline::{Args, Enricher, Level, LogRecord};
use crate::sinks::Sink;

/// Writes one human-readable line per record.
///
/// Also serves as the pipeline's own warning channel: delivery failures
/// elsewhere are reported through [`ConsoleSink::warn`].
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
    minimum_level: Level,
    diagnostics: Enricher,
}

impl ConsoleSink {
    /// Console sink on standard output.
    pub fn stdout(minimum_level: Level) -> Self {
        Self::with_writer(io::stdout(), minimum_level)
    }

    /// Console sink on an arbitrary writer.
    pub fn with_writer<W>(writer: W, minimum_level: Level) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            writer: Mutex::new(Box::new(writer)),
            minimum_level,
            diagnostics: Enricher::default(),
        }
    }

    /// Write a pipeline warning directly, bypassing every other sink.
    ///
    /// Failures are swallowed; there is nowhere left to report them.
    pub fn warn(&self, template: &str, args: Args) {
        let record = self.diagnostics.enrich(Level::Warning, template, args, None);
        if let Err(e) = self.write_line(&record) {
            tracing::warn!(error = %e, "Console sink could not write pipeline warning");
        }
    }

    fn write_line(&self, record: &LogRecord) -> Result<(), SinkError> {
        let line = record.console_line();
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn minimum_level(&self) -> Level {
        self.minimum_level
    }

    fn emit(&self, record: &Arc<LogRecord>) -> Result<(), SinkError> {
        self.write_line(record)?;
        metrics::record_sink_outcome(self.name(), SinkOutcome::Delivered);
        Ok(())
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("minimum_level", &self.minimum_level)
            .finish()
    }
}
