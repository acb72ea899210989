//! HTTP collector sink.
//!
//! # Responsibilities
//! - Serialize each record to the collector JSON shape
//! - POST it from a spawned task with credential and source-type headers
//! - Retry transient failures inside that task, within the configured budget
//! - Report final failures as console warnings and drop the record
//!
//! # Design Decisions
//! - `emit` only serializes and spawns; the caller never awaits the network
//! - One pooled `reqwest::Client` per target, shared by every caller
//! - Concurrency is bounded by the shared [`DeliveryTracker`]; past the bound
//!   records are dropped rather than queued

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use url::Url;

use crate::config::{CollectorTarget, DeliveryConfig};
use crate::dispatch::tracker::{DeliveryGuard, DeliveryTracker};
use crate::error::{ConfigError, DeliveryError, SinkError};
use crate::observability::metrics::{self, SinkOutcome};
use crate::pipeline::{Args, Level, LogRecord};
use crate::resilience::Backoff;
use crate::sinks::console::ConsoleSink;
use crate::sinks::{tls, Sink};

/// Header carrying the collector source-type label.
pub const SOURCE_TYPE_HEADER: &str = "x-source-type";

struct Inner {
    name: String,
    endpoint: Url,
    headers: HeaderMap,
    client: reqwest::Client,
    backoff: Backoff,
    timeout_ms: u64,
    console: Arc<ConsoleSink>,
}

/// Ships records to a remote log collector.
pub struct CollectorSink {
    inner: Arc<Inner>,
    minimum_level: Level,
    tracker: DeliveryTracker,
    runtime: Handle,
}

impl CollectorSink {
    /// Build the sink, its HTTP client and its headers.
    ///
    /// Must be called from within a tokio runtime; deliveries are spawned on it.
    pub fn new(
        target: &CollectorTarget,
        delivery: &DeliveryConfig,
        tracker: DeliveryTracker,
        console: Arc<ConsoleSink>,
    ) -> Result<Self, ConfigError> {
        let runtime = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;
        let endpoint = Url::parse(target.endpoint.trim()).map_err(|e| ConfigError::Collector {
            endpoint: target.endpoint.clone(),
            reason: e.to_string(),
        })?;

        if endpoint.scheme() == "http" {
            tracing::warn!(endpoint = %endpoint, "Collector endpoint is not HTTPS; token is sent in clear text");
        }

        let timeout = Duration::from_millis(delivery.request_timeout_ms);
        let client = tls::build_client(target, timeout)?;
        let headers = collector_headers(target)?;

        let name = match (endpoint.host_str(), endpoint.port_or_known_default()) {
            (Some(host), Some(port)) => format!("collector:{}:{}", host, port),
            _ => format!("collector:{}", endpoint),
        };

        tracing::info!(
            sink = %name,
            policy = ?target.certificate_trust_policy,
            max_attempts = delivery.retries.max_attempts,
            "Collector sink ready"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                name,
                endpoint,
                headers,
                client,
                backoff: Backoff::from(&delivery.retries),
                timeout_ms: delivery.request_timeout_ms,
                console,
            }),
            minimum_level: target.minimum_level.unwrap_or(Level::Debug),
            tracker,
            runtime,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }
}

impl Sink for CollectorSink {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn minimum_level(&self) -> Level {
        self.minimum_level
    }

    fn emit(&self, record: &Arc<LogRecord>) -> Result<(), SinkError> {
        let body = record.to_json()?;
        let guard = self.tracker.try_track().ok_or(SinkError::Saturated {
            limit: self.tracker.limit(),
        })?;

        let inner = Arc::clone(&self.inner);
        self.runtime.spawn(deliver(inner, body, guard));
        Ok(())
    }
}

async fn deliver(inner: Arc<Inner>, body: Vec<u8>, guard: DeliveryGuard) {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match post(&inner, &body).await {
            Ok(()) => {
                metrics::record_sink_outcome(&inner.name, SinkOutcome::Delivered);
                break;
            }
            Err(e) if e.is_retryable() && inner.backoff.allows_retry_after(attempt) => {
                let delay = inner.backoff.delay(attempt);
                tracing::debug!(
                    delivery_id = %guard.id(),
                    sink = %inner.name,
                    attempt,
                    delay = ?delay,
                    error = %e,
                    "Retrying collector delivery"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                metrics::record_sink_outcome(&inner.name, SinkOutcome::Failed);
                inner.console.warn(
                    "Log delivery to {Endpoint} failed after {Attempts} attempt(s): {Error}",
                    Args::new()
                        .with("Endpoint", inner.endpoint.as_str())
                        .with("Attempts", attempt)
                        .with("Error", e.to_string()),
                );
                break;
            }
        }
    }
    drop(guard);
}

async fn post(inner: &Inner, body: &[u8]) -> Result<(), DeliveryError> {
    let response = inner
        .client
        .post(inner.endpoint.clone())
        .headers(inner.headers.clone())
        .body(body.to_vec())
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                DeliveryError::Timeout(inner.timeout_ms)
            } else {
                DeliveryError::Transport(e)
            }
        })?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(DeliveryError::Status(status))
    }
}

fn collector_headers(target: &CollectorTarget) -> Result<HeaderMap, ConfigError> {
    let invalid = |field: &str| ConfigError::Collector {
        endpoint: target.endpoint.clone(),
        reason: format!("{} is not a valid header value", field),
    };

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let mut credential = HeaderValue::from_str(&format!(
        "{} {}",
        target.auth_scheme.trim(),
        target.auth_token.trim()
    ))
    .map_err(|_| invalid("auth_token"))?;
    credential.set_sensitive(true);
    headers.insert(AUTHORIZATION, credential);

    if let Some(source_type) = &target.source_type {
        let value = HeaderValue::from_str(source_type).map_err(|_| invalid("source_type"))?;
        headers.insert(SOURCE_TYPE_HEADER, value);
    }

    Ok(headers)
}
