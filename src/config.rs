//! Configuration types for dns-groups

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

/// Identity the API presents and expects clients to address it by
pub const DEFAULT_SERVER_NAME: &str = "api.bosh-dns";

/// Certificate material for the mutual TLS transport
///
/// All three files are PEM encoded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    /// CA bundle used to verify the API server
    #[serde(default)]
    pub ca_cert_path: PathBuf,

    /// Client certificate presented to the API
    #[serde(default)]
    pub certificate_path: PathBuf,

    /// Private key matching `certificate_path`
    #[serde(default)]
    pub private_key_path: PathBuf,
}

impl TlsConfig {
    /// Check that every path is set
    pub fn validate(&self) -> Result<()> {
        let paths = [
            ("ca_cert_path", &self.ca_cert_path),
            ("certificate_path", &self.certificate_path),
            ("private_key_path", &self.private_key_path),
        ];
        for (key, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(Error::config(key, format!("{key} is not set")));
            }
        }
        Ok(())
    }
}

/// Main configuration for the groups command
///
/// Built from command line flags and environment variables by the binary,
/// or directly by library users.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base address of the DNS health API (e.g. "https://127.0.0.1:53080")
    #[serde(default)]
    pub api_address: String,

    /// Mutual TLS material
    #[serde(default)]
    pub tls: TlsConfig,

    /// Identity name handed to the secured client factory (default: "api.bosh-dns")
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// Overall request timeout (None = whatever the transport enforces)
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_address: String::new(),
            tls: TlsConfig::default(),
            server_name: default_server_name(),
            timeout: None,
        }
    }
}

impl Config {
    /// Validate the configuration before any client is built
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        parse_api_address(&self.api_address)?;
        self.tls.validate()?;
        if self.server_name.trim().is_empty() {
            return Err(Error::config("server_name", "server name is empty"));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(Error::config("timeout", "timeout must be greater than zero"));
        }
        Ok(())
    }
}

/// Parse and check the API base address
///
/// The address must be a non-empty absolute `http` or `https` URL.
pub fn parse_api_address(address: &str) -> Result<Url> {
    let address = address.trim();
    if address.is_empty() {
        return Err(Error::config("api", "API address is empty"));
    }

    let url = Url::parse(address)
        .map_err(|e| Error::config("api", format!("invalid API address '{address}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::config(
            "api",
            format!("unsupported scheme '{other}' in API address '{address}'"),
        )),
    }
}

fn default_server_name() -> String {
    DEFAULT_SERVER_NAME.to_string()
}
