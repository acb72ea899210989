//! Error types for the log pipeline.
//!
//! Only [`ConfigError`] ever escapes to the host, and only at startup.
//! Everything raised while a record is in flight is recovered inside the
//! pipeline and downgraded to a console warning.

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Fatal startup errors: the host must not begin serving.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for the schema.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Semantic validation failed; every problem found is listed.
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// A collector's TLS client could not be built.
    #[error("TLS setup failed: {0}")]
    Tls(#[from] TlsError),

    /// A collector target passed validation but could not be turned into a sink.
    #[error("Collector '{endpoint}' rejected: {reason}")]
    Collector { endpoint: String, reason: String },

    /// Collector sinks need a tokio runtime to spawn deliveries on.
    #[error("No tokio runtime available to host collector deliveries")]
    NoRuntime,
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors building a certificate trust policy.
#[derive(Debug, Error)]
pub enum TlsError {
    /// Fingerprint is not 32 hex-encoded bytes.
    #[error("Invalid SHA-256 fingerprint: {0}")]
    InvalidFingerprint(String),

    /// PEM input held no certificate.
    #[error("No certificate found in PEM input")]
    NoCertificate,

    /// PEM input could not be read or decoded.
    #[error("Certificate read failed: {0}")]
    Pem(#[from] std::io::Error),

    /// rustls rejected the client configuration.
    #[error("rustls error: {0}")]
    Rustls(#[from] rustls::Error),

    /// reqwest could not build the client.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// A single failed delivery attempt to a collector.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Connection, TLS handshake or body transfer failed.
    #[error("transport error: {}", error_chain(.0))]
    Transport(#[source] reqwest::Error),

    /// Collector answered with a non-success status.
    #[error("collector responded with status {0}")]
    Status(reqwest::StatusCode),

    /// Request exceeded the configured deadline.
    #[error("request timed out after {0} ms")]
    Timeout(u64),
}

impl DeliveryError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeliveryError::Transport(_) | DeliveryError::Timeout(_) => true,
            DeliveryError::Status(status) => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}

/// A sink refused or failed to take a record.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Local write failed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be serialized; it is dropped.
    #[error("record could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Too many deliveries already in flight; the record is dropped.
    #[error("{limit} deliveries already in flight")]
    Saturated { limit: usize },
}

/// Flatten an error and its sources into one line.
///
/// reqwest hides TLS and connect causes behind `source()`, so its top-level
/// message alone is rarely actionable.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
