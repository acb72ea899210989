//! Metrics collection and exposition.
//!
//! # Metrics
//! - `log_records_emitted_total` (counter): records enriched, by level
//! - `log_records_filtered_total` (counter): records dropped by the minimum level
//! - `log_sink_outcomes_total` (counter): per sink, by outcome
//! - `log_deliveries_in_flight` (gauge): collector POSTs currently running
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus listener is opt-in via `observability.metrics_enabled`

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::pipeline::Level;

/// What happened to a record at one sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkOutcome {
    Delivered,
    Failed,
    Dropped,
    Panicked,
}

impl SinkOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkOutcome::Delivered => "delivered",
            SinkOutcome::Failed => "failed",
            SinkOutcome::Dropped => "dropped",
            SinkOutcome::Panicked => "panicked",
        }
    }
}

/// Install the Prometheus exporter with an HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_emitted(level: Level) {
    counter!("log_records_emitted_total", "level" => level.as_str()).increment(1);
}

pub fn record_filtered() {
    counter!("log_records_filtered_total").increment(1);
}

pub fn record_sink_outcome(sink: &str, outcome: SinkOutcome) {
    counter!(
        "log_sink_outcomes_total",
        "sink" => sink.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_in_flight(count: usize) {
    gauge!("log_deliveries_in_flight").set(count as f64);
}
