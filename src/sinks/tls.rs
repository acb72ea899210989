//! Certificate trust policies for collector connections.
//!
//! - `Strict`: reqwest's rustls stack with the bundled web PKI roots, plus an
//!   optional PEM bundle of extra roots.
//! - `TrustAll`: certificate and host name checks disabled. Development only.
//! - `PinnedFingerprint`: the leaf certificate's SHA-256 must match. Chain and
//!   host name are not checked, but the handshake signature still is, so the
//!   peer must hold the pinned certificate's private key.

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, ClientConfig, DigitallySignedStruct, SignatureScheme};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::BufReader;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CollectorTarget, TrustPolicy};
use crate::error::TlsError;

/// A SHA-256 certificate fingerprint.
pub type Fingerprint = [u8; 32];

/// Parse a hex fingerprint; colons, spaces and case are ignored.
pub fn parse_fingerprint(text: &str) -> Result<Fingerprint, TlsError> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ':' && !c.is_whitespace())
        .collect();
    let bytes = hex::decode(&cleaned).map_err(|_| TlsError::InvalidFingerprint(text.to_string()))?;
    bytes
        .try_into()
        .map_err(|_| TlsError::InvalidFingerprint(text.to_string()))
}

/// Colon-separated uppercase hex, the form `openssl x509 -fingerprint` prints.
pub fn format_fingerprint(fingerprint: &Fingerprint) -> String {
    fingerprint
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Fingerprint of a DER-encoded certificate.
pub fn fingerprint_der(der: &[u8]) -> Fingerprint {
    Sha256::digest(der).into()
}

/// Fingerprint of the first certificate in a PEM document.
pub fn fingerprint_pem(pem: &[u8]) -> Result<Fingerprint, TlsError> {
    let mut reader = BufReader::new(pem);
    let cert = rustls_pemfile::certs(&mut reader)
        .next()
        .ok_or(TlsError::NoCertificate)??;
    Ok(fingerprint_der(cert.as_ref()))
}

/// Build the shared HTTP client for one collector target.
pub fn build_client(target: &CollectorTarget, timeout: Duration) -> Result<reqwest::Client, TlsError> {
    let builder = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(concat!("trace-log-relay/", env!("CARGO_PKG_VERSION")));

    let builder = match target.certificate_trust_policy {
        TrustPolicy::Strict => {
            let mut builder = builder.use_rustls_tls();
            if let Some(path) = &target.ca_certificate_path {
                let pem = fs::read(path)?;
                for cert in reqwest::Certificate::from_pem_bundle(&pem)? {
                    builder = builder.add_root_certificate(cert);
                }
            }
            builder
        }
        TrustPolicy::TrustAll => {
            tracing::warn!(
                endpoint = %target.endpoint,
                "Certificate validation disabled for collector (TrustAll); do not use in production"
            );
            builder.use_rustls_tls().danger_accept_invalid_certs(true)
        }
        TrustPolicy::PinnedFingerprint => {
            let text = target
                .pinned_fingerprint
                .as_deref()
                .ok_or_else(|| TlsError::InvalidFingerprint(String::new()))?;
            builder.use_preconfigured_tls(pinned_client_config(parse_fingerprint(text)?)?)
        }
    };

    Ok(builder.build()?)
}

/// rustls client configuration that trusts exactly one certificate.
pub fn pinned_client_config(expected: Fingerprint) -> Result<ClientConfig, TlsError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let verifier = FingerprintVerifier {
        expected,
        provider: Arc::clone(&provider),
    };

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();
    Ok(config)
}

/// Accepts a server certificate only if its fingerprint matches.
#[derive(Debug)]
pub struct FingerprintVerifier {
    expected: Fingerprint,
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for FingerprintVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let actual = fingerprint_der(end_entity.as_ref());
        if actual == self.expected {
            Ok(ServerCertVerified::assertion())
        } else {
            tracing::debug!(
                expected = %format_fingerprint(&self.expected),
                actual = %format_fingerprint(&actual),
                "Collector certificate does not match pinned fingerprint"
            );
            Err(rustls::Error::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            ))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
