//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check collector endpoints, credentials and trust policies
//! - Validate value ranges (timeouts > 0, limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - config → Result<(), Vec<ValidationError>>; the only I/O is checking that a CA bundle exists
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{
    CollectorTarget, PipelineConfig, ServiceConfig, SinkTarget, TrustPolicy,
};
use crate::sinks::tls::parse_fingerprint;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("pipeline.sinks is empty")]
    NoSinks,

    #[error("sink {index}: endpoint is empty")]
    EmptyEndpoint { index: usize },

    #[error("sink {index}: endpoint '{endpoint}' is not a URL ({reason})")]
    InvalidEndpoint {
        index: usize,
        endpoint: String,
        reason: String,
    },

    #[error("sink {index}: endpoint scheme '{scheme}' is not http or https")]
    UnsupportedScheme { index: usize, scheme: String },

    #[error("sink {index}: auth_token is empty")]
    EmptyAuthToken { index: usize },

    #[error("sink {index}: auth_scheme must be a single non-empty word")]
    InvalidAuthScheme { index: usize },

    #[error("sink {index}: {field} contains characters not allowed in an HTTP header")]
    InvalidHeaderValue { index: usize, field: &'static str },

    #[error("sink {index}: PinnedFingerprint policy requires pinned_fingerprint")]
    MissingFingerprint { index: usize },

    #[error("sink {index}: pinned_fingerprint is not a SHA-256 hex digest")]
    InvalidFingerprint { index: usize },

    #[error("sink {index}: ca_certificate_path '{path}' is not a readable file")]
    UnreadableCaBundle { index: usize, path: String },

    #[error("sink {index}: ca_certificate_path is only used with the Strict policy")]
    CaWithoutStrict { index: usize },

    #[error("delivery.request_timeout_ms must be greater than 0")]
    ZeroTimeout,

    #[error("delivery.max_in_flight must be greater than 0")]
    ZeroInFlight,

    #[error("delivery.retries.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("delivery.retries.base_delay_ms exceeds max_delay_ms")]
    BackoffInverted,
}

/// Validate the whole service configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.server.bind_address.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if let Err(pipeline_errors) = validate_pipeline(&config.pipeline) {
        errors.extend(pipeline_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate only the pipeline section.
pub fn validate_pipeline(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.sinks.is_empty() {
        errors.push(ValidationError::NoSinks);
    }

    for (index, sink) in config.sinks.iter().enumerate() {
        if let SinkTarget::HttpCollector(target) = sink {
            validate_collector(index, target, &mut errors);
        }
    }

    let delivery = &config.delivery;
    if delivery.request_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if delivery.max_in_flight == 0 {
        errors.push(ValidationError::ZeroInFlight);
    }
    if delivery.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    if delivery.retries.base_delay_ms > delivery.retries.max_delay_ms {
        errors.push(ValidationError::BackoffInverted);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_collector(index: usize, target: &CollectorTarget, errors: &mut Vec<ValidationError>) {
    let endpoint = target.endpoint.trim();
    if endpoint.is_empty() {
        errors.push(ValidationError::EmptyEndpoint { index });
    } else {
        match Url::parse(endpoint) {
            Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
                errors.push(ValidationError::UnsupportedScheme {
                    index,
                    scheme: url.scheme().to_string(),
                });
            }
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::InvalidEndpoint {
                index,
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    if target.auth_token.trim().is_empty() {
        errors.push(ValidationError::EmptyAuthToken { index });
    }
    let scheme = target.auth_scheme.trim();
    if scheme.is_empty() || scheme.contains(char::is_whitespace) {
        errors.push(ValidationError::InvalidAuthScheme { index });
    }
    if !is_header_safe(&target.auth_token) {
        errors.push(ValidationError::InvalidHeaderValue {
            index,
            field: "auth_token",
        });
    }
    if let Some(source_type) = &target.source_type {
        if !is_header_safe(source_type) {
            errors.push(ValidationError::InvalidHeaderValue {
                index,
                field: "source_type",
            });
        }
    }

    match (&target.certificate_trust_policy, &target.pinned_fingerprint) {
        (TrustPolicy::PinnedFingerprint, None) => {
            errors.push(ValidationError::MissingFingerprint { index });
        }
        (_, Some(fingerprint)) if parse_fingerprint(fingerprint).is_err() => {
            errors.push(ValidationError::InvalidFingerprint { index });
        }
        _ => {}
    }

    if let Some(path) = &target.ca_certificate_path {
        if target.certificate_trust_policy != TrustPolicy::Strict {
            errors.push(ValidationError::CaWithoutStrict { index });
        } else if !path.is_file() {
            errors.push(ValidationError::UnreadableCaBundle {
                index,
                path: path.display().to_string(),
            });
        }
    }
}

/// Visible ASCII, spaces and tabs only.
fn is_header_safe(value: &str) -> bool {
    value.bytes().all(|b| b == b'\t' || (0x20..0x7f).contains(&b))
}
