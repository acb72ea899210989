//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the demo host
//! and the log pipeline. All types derive Serde traits for deserialization
//! from TOML files.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

use crate::pipeline::Level;

/// Root configuration for the demo host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Diagnostics of the process itself (not the pipeline's output).
    pub observability: ObservabilityConfig,

    /// The structured-log pipeline.
    pub pipeline: PipelineConfig,
}

/// Listener configuration for the demo host.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level for the process's own diagnostics (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Log pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Records below this level are dropped before enrichment.
    pub minimum_level: Level,

    /// Properties attached to every record unless the caller supplies the same name.
    pub static_properties: Map<String, Value>,

    /// Delivery destinations.
    pub sinks: Vec<SinkTarget>,

    /// Collector delivery tuning.
    pub delivery: DeliveryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            minimum_level: Level::Information,
            static_properties: Map::new(),
            sinks: vec![SinkTarget::Console(ConsoleTarget::default())],
            delivery: DeliveryConfig::default(),
        }
    }
}

/// One delivery destination.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind")]
pub enum SinkTarget {
    /// Human-readable lines on stdout.
    Console(ConsoleTarget),
    /// JSON over HTTP(S) POST to a log collector.
    HttpCollector(CollectorTarget),
}

/// Console sink settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConsoleTarget {
    /// Per-sink level floor on top of the pipeline minimum.
    #[serde(default)]
    pub minimum_level: Option<Level>,
}

/// HTTP collector sink settings.
#[derive(Clone, Deserialize, Serialize)]
pub struct CollectorTarget {
    /// Collector ingestion URL.
    pub endpoint: String,

    /// Credential sent in the `Authorization` header.
    pub auth_token: String,

    /// Scheme prefixed to the token ("Bearer", or "Splunk" for HEC).
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,

    /// Free-text label sent as `X-Source-Type`.
    #[serde(default)]
    pub source_type: Option<String>,

    /// How the collector's certificate is validated.
    #[serde(default)]
    pub certificate_trust_policy: TrustPolicy,

    /// SHA-256 of the collector's DER certificate, hex, colons optional.
    #[serde(default)]
    pub pinned_fingerprint: Option<String>,

    /// Extra PEM roots trusted under the Strict policy.
    #[serde(default)]
    pub ca_certificate_path: Option<PathBuf>,

    /// Per-sink level floor on top of the pipeline minimum.
    #[serde(default)]
    pub minimum_level: Option<Level>,
}

fn default_auth_scheme() -> String {
    "Bearer".to_string()
}

impl CollectorTarget {
    /// Minimal target with Strict validation.
    pub fn new(endpoint: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token: auth_token.into(),
            auth_scheme: default_auth_scheme(),
            source_type: None,
            certificate_trust_policy: TrustPolicy::Strict,
            pinned_fingerprint: None,
            ca_certificate_path: None,
            minimum_level: None,
        }
    }
}

impl fmt::Debug for CollectorTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorTarget")
            .field("endpoint", &self.endpoint)
            .field("auth_token", &"<redacted>")
            .field("auth_scheme", &self.auth_scheme)
            .field("source_type", &self.source_type)
            .field("certificate_trust_policy", &self.certificate_trust_policy)
            .field("pinned_fingerprint", &self.pinned_fingerprint)
            .field("ca_certificate_path", &self.ca_certificate_path)
            .field("minimum_level", &self.minimum_level)
            .finish()
    }
}

/// Certificate validation policy for a collector connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum TrustPolicy {
    /// Standard chain and host name validation.
    #[default]
    #[serde(alias = "strict")]
    Strict,
    /// Accept any certificate. Development only.
    #[serde(alias = "trust_all")]
    TrustAll,
    /// Accept only the certificate matching `pinned_fingerprint`.
    #[serde(alias = "pinned_fingerprint")]
    PinnedFingerprint,
}

/// Collector delivery tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Deadline for a single POST, in milliseconds.
    pub request_timeout_ms: u64,

    /// Concurrent deliveries allowed across all collectors.
    pub max_in_flight: usize,

    /// How long shutdown waits for in-flight deliveries.
    pub shutdown_grace_secs: u64,

    /// Retries inside the delivery task.
    pub retries: RetryConfig,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5_000,
            max_in_flight: 1_024,
            shutdown_grace_secs: 5,
            retries: RetryConfig::default(),
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per record, 1 meaning no retry.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 100,
            max_delay_ms: 2_000,
        }
    }
}
