//! Certificate trust policies against a collector with a self-signed certificate.

use std::sync::Arc;
use std::time::Duration;

use trace_log_relay::config::{CollectorTarget, TrustPolicy};
use trace_log_relay::pipeline::{Args, Level, LoggerPipeline};
use trace_log_relay::sinks::ConsoleSink;

mod common;

use common::{MockCollector, SharedBuffer, FIXTURE_FINGERPRINT};

fn pipeline_for(target: CollectorTarget, console: &SharedBuffer) -> LoggerPipeline {
    LoggerPipeline::builder()
        .diagnostics(Arc::new(ConsoleSink::with_writer(console.clone(), Level::Debug)))
        .collector(target)
        .build()
        .unwrap()
}

fn target(collector: &MockCollector, policy: TrustPolicy) -> CollectorTarget {
    let mut target = CollectorTarget::new(&collector.endpoint, "test-hec-token");
    target.certificate_trust_policy = policy;
    target
}

#[tokio::test]
async fn test_trust_all_accepts_self_signed() {
    let mut collector = common::start_tls_collector().await;
    let console = SharedBuffer::default();
    let pipeline = pipeline_for(target(&collector, TrustPolicy::TrustAll), &console);

    pipeline.log(Level::Information, "Received request", Args::new());

    let event = collector.next_event().await;
    assert_eq!(event.body["message"], "Received request");
    assert!(pipeline.shutdown(Duration::from_secs(2)).await);
    assert!(console.warnings().is_empty());
}

#[tokio::test]
async fn test_strict_rejects_self_signed() {
    let collector = common::start_tls_collector().await;
    let console = SharedBuffer::default();
    let pipeline = pipeline_for(target(&collector, TrustPolicy::Strict), &console);

    pipeline.log(Level::Information, "Received request", Args::new());

    assert!(pipeline.shutdown(Duration::from_secs(5)).await);
    let warnings = console.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Log delivery to https://127.0.0.1:"));
    assert_eq!(collector.calls(), 0);
}

#[tokio::test]
async fn test_pinned_fingerprint_match() {
    let mut collector = common::start_tls_collector().await;
    let console = SharedBuffer::default();
    let mut target = target(&collector, TrustPolicy::PinnedFingerprint);
    target.pinned_fingerprint = Some(FIXTURE_FINGERPRINT.to_string());
    let pipeline = pipeline_for(target, &console);

    pipeline.log(Level::Warning, "Pinned {Mode}", Args::new().push("ok"));

    let event = collector.next_event().await;
    assert_eq!(event.body["message"], "Pinned ok");
    assert!(pipeline.shutdown(Duration::from_secs(2)).await);
    assert!(console.warnings().is_empty());
}

#[tokio::test]
async fn test_pinned_fingerprint_mismatch() {
    let collector = common::start_tls_collector().await;
    let console = SharedBuffer::default();
    let mut target = target(&collector, TrustPolicy::PinnedFingerprint);
    target.pinned_fingerprint = Some("00".repeat(32));
    let pipeline = pipeline_for(target, &console);

    pipeline.log(Level::Information, "Received request", Args::new());

    assert!(pipeline.shutdown(Duration::from_secs(5)).await);
    assert_eq!(console.warnings().len(), 1);
    assert_eq!(collector.calls(), 0);
}
