//! The logging entry point.
//!
//! # Responsibilities
//! - Drop records below the minimum level before any work is done
//! - Resolve the trace context (explicit, else task-local)
//! - Enrich and dispatch; never surface an error to the caller
//! - Drain in-flight collector deliveries on shutdown
//!
//! # Design Decisions
//! - No global logger: a `LoggerPipeline` is built once and cloned into
//!   whatever needs it (cheap, shared `Arc`)
//! - Pipeline warnings go to the diagnostics console, which is the configured
//!   console sink when there is one and a standalone stdout writer otherwise

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::config::validation::validate_pipeline;
use crate::config::{CollectorTarget, DeliveryConfig, PipelineConfig, SinkTarget};
use crate::context::{self, TraceContext};
use crate::dispatch::{DeliveryTracker, Dispatcher};
use crate::error::ConfigError;
use crate::observability::metrics;
use crate::pipeline::{Args, Enricher, Level};
use crate::sinks::{CollectorSink, ConsoleSink, Sink};

struct Inner {
    minimum_level: Level,
    enricher: Enricher,
    dispatcher: Dispatcher,
    tracker: DeliveryTracker,
    shutdown_grace: Duration,
}

/// Structured-log pipeline handle.
#[derive(Clone)]
pub struct LoggerPipeline {
    inner: Arc<Inner>,
}

impl LoggerPipeline {
    /// Validate `config` and build every sink it names.
    ///
    /// Collector sinks capture the current tokio runtime, so this must run
    /// inside one when any are configured.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        validate_pipeline(config).map_err(ConfigError::Validation)?;

        let mut builder = Self::builder()
            .minimum_level(config.minimum_level)
            .delivery(config.delivery.clone());
        for (name, value) in &config.static_properties {
            builder = builder.static_property(name.clone(), value.clone());
        }

        for target in &config.sinks {
            builder = match target {
                SinkTarget::Console(console) => builder.console(Arc::new(ConsoleSink::stdout(
                    console.minimum_level.unwrap_or(Level::Debug),
                ))),
                SinkTarget::HttpCollector(collector) => builder.collector(collector.clone()),
            };
        }

        builder.build()
    }

    pub fn builder() -> LoggerPipelineBuilder {
        LoggerPipelineBuilder::default()
    }

    pub fn minimum_level(&self) -> Level {
        self.inner.minimum_level
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.inner.minimum_level
    }

    /// Log with whatever trace context is active on the calling task.
    pub fn log(&self, level: Level, template: &str, args: Args) {
        if !self.is_enabled(level) {
            metrics::record_filtered();
            return;
        }
        let context = context::current();
        self.emit(level, template, args, context.as_ref());
    }

    /// Log under an explicit trace context, ignoring the task-local one.
    pub fn log_in_context(&self, context: &TraceContext, level: Level, template: &str, args: Args) {
        if !self.is_enabled(level) {
            metrics::record_filtered();
            return;
        }
        self.emit(level, template, args, Some(context));
    }

    fn emit(&self, level: Level, template: &str, args: Args, context: Option<&TraceContext>) {
        if !args.errors().is_empty() {
            self.diagnostics().warn(
                "Log record dropped, arguments could not be captured for {Template}: {Errors}",
                Args::new()
                    .with("Template", template)
                    .with("Errors", args.errors().join("; ")),
            );
            return;
        }

        metrics::record_emitted(level);
        let record = self.inner.enricher.enrich(level, template, args, context);
        self.inner.dispatcher.dispatch(record);
    }

    /// Console used for the pipeline's own warnings.
    pub fn diagnostics(&self) -> &Arc<ConsoleSink> {
        self.inner.dispatcher.diagnostics()
    }

    /// Collector deliveries still running.
    pub fn in_flight(&self) -> usize {
        self.inner.tracker.in_flight()
    }

    /// Grace period from `delivery.shutdown_grace_secs`.
    pub fn default_grace(&self) -> Duration {
        self.inner.shutdown_grace
    }

    /// Wait up to `grace` for in-flight deliveries.
    ///
    /// Returns `true` if all of them finished; the rest are abandoned.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        let pending = self.in_flight();
        tracing::info!(pending, grace = ?grace, "Draining log deliveries");

        if self.inner.tracker.wait_idle(grace).await {
            tracing::info!("Log deliveries drained");
            return true;
        }

        let abandoned = self.in_flight();
        tracing::warn!(abandoned, "Shutdown grace elapsed with log deliveries in flight");
        self.diagnostics().warn(
            "Shutdown abandoned {Count} in-flight log deliveries",
            Args::new().with("Count", abandoned),
        );
        false
    }
}

impl std::fmt::Debug for LoggerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerPipeline")
            .field("minimum_level", &self.inner.minimum_level)
            .field("dispatcher", &self.inner.dispatcher)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

enum PendingSink {
    Ready(Arc<dyn Sink>),
    Collector(CollectorTarget),
}

/// Programmatic construction, for custom sinks and tests.
#[derive(Default)]
pub struct LoggerPipelineBuilder {
    minimum_level: Level,
    static_properties: Map<String, Value>,
    sinks: Vec<PendingSink>,
    diagnostics: Option<Arc<ConsoleSink>>,
    delivery: DeliveryConfig,
}

impl LoggerPipelineBuilder {
    pub fn minimum_level(mut self, level: Level) -> Self {
        self.minimum_level = level;
        self
    }

    pub fn static_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.static_properties.insert(name.into(), value.into());
        self
    }

    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(PendingSink::Ready(sink));
        self
    }

    /// Add a console sink. The first one added also receives pipeline warnings.
    pub fn console(mut self, console: Arc<ConsoleSink>) -> Self {
        if self.diagnostics.is_none() {
            self.diagnostics = Some(Arc::clone(&console));
        }
        self.sinks.push(PendingSink::Ready(console));
        self
    }

    /// Route pipeline warnings to `console` without making it a sink.
    pub fn diagnostics(mut self, console: Arc<ConsoleSink>) -> Self {
        self.diagnostics = Some(console);
        self
    }

    /// Add a collector; it is built in [`build`](Self::build).
    pub fn collector(mut self, target: CollectorTarget) -> Self {
        self.sinks.push(PendingSink::Collector(target));
        self
    }

    pub fn delivery(mut self, delivery: DeliveryConfig) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn build(self) -> Result<LoggerPipeline, ConfigError> {
        let diagnostics = self
            .diagnostics
            .unwrap_or_else(|| Arc::new(ConsoleSink::stdout(Level::Debug)));
        let tracker = DeliveryTracker::new(self.delivery.max_in_flight);

        let mut sinks: Vec<Arc<dyn Sink>> = Vec::with_capacity(self.sinks.len());
        for pending in self.sinks {
            match pending {
                PendingSink::Ready(sink) => sinks.push(sink),
                PendingSink::Collector(target) => sinks.push(Arc::new(CollectorSink::new(
                    &target,
                    &self.delivery,
                    tracker.clone(),
                    Arc::clone(&diagnostics),
                )?)),
            }
        }

        tracing::info!(
            minimum_level = %self.minimum_level,
            sinks = sinks.len(),
            static_properties = self.static_properties.len(),
            "Log pipeline built"
        );

        Ok(LoggerPipeline {
            inner: Arc::new(Inner {
                minimum_level: self.minimum_level,
                enricher: Enricher::new(self.static_properties),
                dispatcher: Dispatcher::new(sinks, diagnostics),
                tracker,
                shutdown_grace: Duration::from_secs(self.delivery.shutdown_grace_secs),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::pipeline::LogRecord;
    use std::collections::HashMap;
    use std::io::{self, Write};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn warnings(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .filter(|line| line.contains(" WRN] "))
                .map(str::to_string)
                .collect()
        }
    }

    #[derive(Default)]
    struct Capture(Mutex<Vec<Arc<LogRecord>>>);

    impl Sink for Capture {
        fn name(&self) -> &str {
            "capture"
        }
        fn emit(&self, record: &Arc<LogRecord>) -> Result<(), SinkError> {
            self.0.lock().unwrap().push(Arc::clone(record));
            Ok(())
        }
    }

    impl Capture {
        fn records(&self) -> Vec<Arc<LogRecord>> {
            self.0.lock().unwrap().clone()
        }
    }

    fn pipeline(level: Level) -> (LoggerPipeline, Arc<Capture>) {
        let capture = Arc::new(Capture::default());
        let pipeline = LoggerPipeline::builder()
            .minimum_level(level)
            .diagnostics(Arc::new(ConsoleSink::with_writer(std::io::sink(), Level::Debug)))
            .static_property("Application", "WeatherApi")
            .sink(capture.clone())
            .build()
            .unwrap();
        (pipeline, capture)
    }

    #[test]
    fn test_filtered_before_enrichment() {
        let (pipeline, capture) = pipeline(Level::Warning);
        assert!(!pipeline.is_enabled(Level::Information));
        pipeline.log(Level::Information, "quiet", Args::new());
        pipeline.log(Level::Error, "loud", Args::new());

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].render_message(), "loud");
    }

    #[test]
    fn test_task_local_context_used() {
        let (pipeline, capture) = pipeline(Level::Debug);
        let ctx = TraceContext::new_root();
        context::sync_scope(ctx.clone(), || {
            pipeline.log(Level::Information, "inside", Args::new());
        });
        pipeline.log(Level::Information, "outside", Args::new());

        let records = capture.records();
        assert_eq!(records[0].trace_id(), Some(ctx.trace_id()));
        assert_eq!(records[1].trace_id(), None);
    }

    #[test]
    fn test_explicit_context_wins() {
        let (pipeline, capture) = pipeline(Level::Debug);
        let ambient = TraceContext::new_root();
        let explicit = TraceContext::new_root();
        context::sync_scope(ambient, || {
            pipeline.log_in_context(&explicit, Level::Warning, "explicit", Args::new());
        });
        assert_eq!(capture.records()[0].span_id(), Some(explicit.span_id()));
    }

    #[test]
    fn test_static_property_attached() {
        let (pipeline, capture) = pipeline(Level::Debug);
        pipeline.log(Level::Information, "hi", Args::new());
        assert_eq!(capture.records()[0].properties()["Application"], "WeatherApi");
    }

    #[test]
    fn test_uncapturable_args_drop_record() {
        let console = Buffer::default();
        let capture = Arc::new(Capture::default());
        let pipeline = LoggerPipeline::builder()
            .diagnostics(Arc::new(ConsoleSink::with_writer(console.clone(), Level::Debug)))
            .sink(capture.clone())
            .build()
            .unwrap();

        // JSON object keys must be strings.
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);
        pipeline.log(Level::Error, "Bad {X}", Args::new().with("X", bad));
        pipeline.log(Level::Information, "Good {X}", Args::new().with("X", 1));

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].render_message(), "Good 1");

        let warnings = console.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("arguments could not be captured for Bad {X}"));
        assert!(warnings[0].contains("X: key must be a string"));
    }

    #[test]
    fn test_collector_requires_runtime() {
        let result = LoggerPipeline::builder()
            .collector(CollectorTarget::new("https://localhost:8088", "token"))
            .build();
        assert!(matches!(result, Err(ConfigError::NoRuntime)));
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = PipelineConfig {
            sinks: Vec::new(),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            LoggerPipeline::from_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_shutdown_without_deliveries() {
        let (pipeline, _) = pipeline(Level::Debug);
        assert!(pipeline.shutdown(Duration::from_millis(10)).await);
    }
}
