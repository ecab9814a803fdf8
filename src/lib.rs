//! # dns-groups
//!
//! Reads the instance-group health of a DNS health API and renders it as a
//! table.
//!
//! The pipeline is strictly sequential and fails closed:
//!
//! 1. A [`SecureClientFactory`] builds a mutual TLS client from three PEM files
//! 2. [`GroupQuery`] sends `GET <api>/groups` and checks for `200 OK`
//! 3. [`RecordStream`] decodes the body one JSON record at a time
//! 4. [`TableModel`] collects the records in stream order
//! 5. A [`Renderer`] writes the finished table
//!
//! ## Quick Start
//!
//! ```no_run
//! use dns_groups::{Config, GroupsCommand, MutualTlsClientFactory, TextRenderer, TlsConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         api_address: "https://127.0.0.1:53080".to_string(),
//!         tls: TlsConfig {
//!             ca_cert_path: "/var/vcap/jobs/bosh-dns/config/certs/api/ca.crt".into(),
//!             certificate_path: "/var/vcap/jobs/bosh-dns/config/certs/api/client.crt".into(),
//!             private_key_path: "/var/vcap/jobs/bosh-dns/config/certs/api/client.key".into(),
//!         },
//!         ..Default::default()
//!     };
//!
//!     let mut command = GroupsCommand::new(
//!         config,
//!         MutualTlsClientFactory,
//!         TextRenderer::new(std::io::stdout()),
//!     );
//!     command.execute().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// The groups command
pub mod command;
/// Configuration types
pub mod config;
/// Streaming JSON record decoding
pub mod decoder;
/// Error types
pub mod error;
/// The `/groups` query
pub mod query;
/// Table output
pub mod render;
/// Groups table model
pub mod table;
/// Secured client construction
pub mod tls;
/// Core types
pub mod types;

// Re-export commonly used types
pub use command::GroupsCommand;
pub use config::{Config, TlsConfig};
pub use decoder::{ChunkSource, RecordDecoder, RecordStream};
pub use error::{DecodeError, Error, Result, Stage};
pub use query::{GroupQuery, GroupStream};
pub use render::{JsonRenderer, Renderer, TextRenderer};
pub use table::{Header, TableModel, Value};
pub use tls::{MutualTlsClientFactory, SecureClientFactory, SecuredClient};
pub use types::{GroupRecord, HealthState};
