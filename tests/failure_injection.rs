//! Failure injection tests for the log pipeline.

use axum::http::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use trace_log_relay::config::{CollectorTarget, DeliveryConfig, RetryConfig};
use trace_log_relay::error::SinkError;
use trace_log_relay::pipeline::{Args, Level, LogRecord, LoggerPipeline};
use trace_log_relay::sinks::{ConsoleSink, Sink};

mod common;

use common::SharedBuffer;

struct AlwaysFails;

impl Sink for AlwaysFails {
    fn name(&self) -> &str {
        "always-fails"
    }

    fn emit(&self, _: &Arc<LogRecord>) -> Result<(), SinkError> {
        Err(SinkError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "collector went away",
        )))
    }
}

struct AlwaysPanics(AtomicUsize);

impl Sink for AlwaysPanics {
    fn name(&self) -> &str {
        "always-panics"
    }

    fn emit(&self, _: &Arc<LogRecord>) -> Result<(), SinkError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        panic!("sink bug")
    }
}

#[test]
fn test_failing_sinks_do_not_affect_console() {
    let console = SharedBuffer::default();
    let panics = Arc::new(AlwaysPanics(AtomicUsize::new(0)));
    let pipeline = LoggerPipeline::builder()
        .sink(Arc::new(AlwaysFails))
        .sink(panics.clone())
        .console(Arc::new(ConsoleSink::with_writer(console.clone(), Level::Debug)))
        .build()
        .unwrap();

    for i in 0..10 {
        pipeline.log(Level::Information, "Request {Index}", Args::new().with("Index", i));
    }

    let records: Vec<String> = console
        .lines()
        .into_iter()
        .filter(|line| line.contains(" INF] Request "))
        .collect();
    assert_eq!(records.len(), 10);
    assert_eq!(panics.0.load(Ordering::SeqCst), 10);

    let warnings = console.warnings();
    assert_eq!(warnings.len(), 20);
    assert!(warnings.iter().any(|w| w.contains("Log sink always-fails failed")));
    assert!(warnings.iter().any(|w| w.contains("Log sink always-panics panicked: sink bug")));
}

#[tokio::test]
async fn test_retry_on_server_error() {
    let mut collector = common::start_programmable_collector(|call| {
        if call < 2 {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::OK
        }
    })
    .await;

    let console = SharedBuffer::default();
    let pipeline = LoggerPipeline::builder()
        .diagnostics(Arc::new(ConsoleSink::with_writer(console.clone(), Level::Debug)))
        .collector(CollectorTarget::new(&collector.endpoint, "token"))
        .delivery(DeliveryConfig {
            retries: RetryConfig {
                max_attempts: 3,
                base_delay_ms: 10,
                max_delay_ms: 50,
            },
            ..DeliveryConfig::default()
        })
        .build()
        .unwrap();

    pipeline.log(Level::Error, "Retried", Args::new());

    let event = collector.next_event().await;
    assert_eq!(event.body["message"], "Retried");
    assert!(pipeline.shutdown(Duration::from_secs(2)).await);
    assert_eq!(collector.calls(), 3);
    assert!(console.warnings().is_empty());
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let collector = common::start_programmable_collector(|_| StatusCode::FORBIDDEN).await;

    let console = SharedBuffer::default();
    let pipeline = LoggerPipeline::builder()
        .diagnostics(Arc::new(ConsoleSink::with_writer(console.clone(), Level::Debug)))
        .collector(CollectorTarget::new(&collector.endpoint, "wrong-token"))
        .delivery(DeliveryConfig {
            retries: RetryConfig {
                max_attempts: 5,
                base_delay_ms: 10,
                max_delay_ms: 50,
            },
            ..DeliveryConfig::default()
        })
        .build()
        .unwrap();

    pipeline.log(Level::Information, "Rejected", Args::new());

    assert!(pipeline.shutdown(Duration::from_secs(2)).await);
    assert_eq!(collector.calls(), 1);
    let warnings = console.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("403"));
}

#[tokio::test]
async fn test_saturation_drops_and_shutdown_abandons() {
    let endpoint = common::blackhole_endpoint().await;

    let console = SharedBuffer::default();
    let pipeline = LoggerPipeline::builder()
        .diagnostics(Arc::new(ConsoleSink::with_writer(console.clone(), Level::Debug)))
        .collector(CollectorTarget::new(&endpoint, "token"))
        .delivery(DeliveryConfig {
            max_in_flight: 1,
            request_timeout_ms: 10_000,
            ..DeliveryConfig::default()
        })
        .build()
        .unwrap();

    pipeline.log(Level::Information, "first", Args::new());
    pipeline.log(Level::Information, "second", Args::new());

    assert_eq!(pipeline.in_flight(), 1);
    let warnings = console.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("1 deliveries already in flight"));

    assert!(!pipeline.shutdown(Duration::from_millis(50)).await);
    assert!(console.text().contains("Shutdown abandoned 1 in-flight log deliveries"));
}

#[tokio::test]
async fn test_unreachable_collector_times_out_quietly_for_caller() {
    let endpoint = common::unreachable_endpoint();

    let console = SharedBuffer::default();
    let pipeline = LoggerPipeline::builder()
        .console(Arc::new(ConsoleSink::with_writer(console.clone(), Level::Debug)))
        .collector(CollectorTarget::new(&endpoint, "token"))
        .build()
        .unwrap();

    pipeline.log(Level::Fatal, "Collector down", Args::new());

    assert!(console.text().contains("FTL] Collector down"));
    let warnings = console.wait_for_warnings(1, Duration::from_secs(5)).await;
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("failed after 1 attempt(s)"));
}
