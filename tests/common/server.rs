//! Mock API server and client helpers

use dns_groups::config::TlsConfig;
use dns_groups::{Config, Result, SecureClientFactory, SecuredClient};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start a server answering `GET /groups` exactly once
pub async fn groups_server(status: u16, body: impl Into<String>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body.into()))
        .expect(1)
        .mount(&server)
        .await;
    server
}

/// Address on localhost that refuses connections
pub fn refused_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

/// Factory that ignores certificate material and returns a plain HTTP client
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainClientFactory;

impl SecureClientFactory for PlainClientFactory {
    fn build(
        &self,
        identity: &str,
        _tls: &TlsConfig,
        timeout: Option<Duration>,
    ) -> Result<SecuredClient> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().expect("plain client builds");
        Ok(SecuredClient::from_client(client, identity))
    }
}

/// Configuration pointing at `api_address` with placeholder TLS paths
pub fn test_config(api_address: &str) -> Config {
    Config {
        api_address: api_address.to_string(),
        tls: TlsConfig {
            ca_cert_path: "ca.pem".into(),
            certificate_path: "client.pem".into(),
            private_key_path: "client.key".into(),
        },
        ..Default::default()
    }
}
