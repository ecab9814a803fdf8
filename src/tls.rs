//! Secured client construction for the mutual TLS transport
//!
//! The query code never builds HTTP clients itself. It asks a
//! [`SecureClientFactory`] for a [`SecuredClient`], which lets the command
//! line use real certificate material while tests hand in a plain client.

use crate::config::TlsConfig;
use crate::error::{Error, Result};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const PEM_CERTIFICATE_MARKER: &[u8] = b"-----BEGIN CERTIFICATE-----";

/// An HTTP client that is ready to talk to the API
#[derive(Clone, Debug)]
pub struct SecuredClient {
    client: reqwest::Client,
    identity: String,
}

impl SecuredClient {
    /// Wrap an already configured client
    pub fn from_client(client: reqwest::Client, identity: impl Into<String>) -> Self {
        Self {
            client,
            identity: identity.into(),
        }
    }

    /// The underlying HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Identity name the client was built for
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// Capability to produce an authenticated client
///
/// Implementations must report unreadable or malformed material as
/// [`Error::Config`] so the failure is attributed to setup rather than to
/// the query.
pub trait SecureClientFactory {
    /// Build a client for `identity` from the given certificate material
    fn build(
        &self,
        identity: &str,
        tls: &TlsConfig,
        timeout: Option<Duration>,
    ) -> Result<SecuredClient>;
}

/// Builds rustls-backed reqwest clients from PEM files on disk
///
/// The resulting client trusts only the configured CA bundle and presents
/// the configured client certificate.
#[derive(Clone, Copy, Debug, Default)]
pub struct MutualTlsClientFactory;

impl SecureClientFactory for MutualTlsClientFactory {
    fn build(
        &self,
        identity: &str,
        tls: &TlsConfig,
        timeout: Option<Duration>,
    ) -> Result<SecuredClient> {
        tls.validate()?;

        let ca_pem = read_pem("ca_cert_path", &tls.ca_cert_path)?;
        require_certificate("ca_cert_path", &tls.ca_cert_path, &ca_pem)?;
        let ca_cert = reqwest::Certificate::from_pem(&ca_pem).map_err(|e| {
            Error::config(
                "ca_cert_path",
                format!("invalid CA certificate '{}': {}", tls.ca_cert_path.display(), e),
            )
        })?;

        let cert_pem = read_pem("certificate_path", &tls.certificate_path)?;
        require_certificate("certificate_path", &tls.certificate_path, &cert_pem)?;
        let key_pem = read_pem("private_key_path", &tls.private_key_path)?;

        // rustls identities are parsed from a single buffer holding both
        let mut identity_pem = cert_pem;
        identity_pem.push(b'\n');
        identity_pem.extend_from_slice(&key_pem);
        let client_identity = reqwest::Identity::from_pem(&identity_pem).map_err(|e| {
            Error::config(
                "private_key_path",
                format!(
                    "invalid client certificate/key pair '{}' / '{}': {}",
                    tls.certificate_path.display(),
                    tls.private_key_path.display(),
                    e
                ),
            )
        })?;

        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(false)
            .add_root_certificate(ca_cert)
            .identity(client_identity);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::config("tls", format!("failed to create TLS client: {e}")))?;

        debug!(identity, ca = %tls.ca_cert_path.display(), "built mutual TLS client");
        Ok(SecuredClient::from_client(client, identity))
    }
}

fn read_pem(key: &str, path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| Error::config(key, format!("failed to read '{}': {}", path.display(), e)))
}

fn require_certificate(key: &str, path: &Path, pem: &[u8]) -> Result<()> {
    let found = pem
        .windows(PEM_CERTIFICATE_MARKER.len())
        .any(|window| window == PEM_CERTIFICATE_MARKER);
    if found {
        Ok(())
    } else {
        Err(Error::config(
            key,
            format!("no PEM certificate found in '{}'", path.display()),
        ))
    }
}
