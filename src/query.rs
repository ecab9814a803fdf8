//! The `/groups` query against the DNS health API

use crate::config::parse_api_address;
use crate::decoder::RecordStream;
use crate::error::{Error, Result};
use crate::table::TableModel;
use crate::tls::SecuredClient;
use crate::types::GroupRecord;
use tracing::{debug, warn};

/// Resource path of the groups endpoint
pub const GROUPS_PATH: &str = "/groups";

/// Stream of group records backed by a live response body
pub type GroupStream = RecordStream<reqwest::Response, GroupRecord>;

/// A single GET of `<api>/groups`
#[derive(Clone, Debug)]
pub struct GroupQuery {
    client: SecuredClient,
    url: String,
}

impl GroupQuery {
    /// Prepare the query
    ///
    /// # Errors
    /// Returns [`Error::Config`] if `api_address` is empty or not an
    /// absolute http(s) URL.
    pub fn new(client: SecuredClient, api_address: &str) -> Result<Self> {
        parse_api_address(api_address)?;
        let url = format!(
            "{}{}",
            api_address.trim().trim_end_matches('/'),
            GROUPS_PATH
        );
        Ok(Self { client, url })
    }

    /// The full request URL
    pub fn request_url(&self) -> &str {
        &self.url
    }

    /// Send the request and return the undecoded record stream
    ///
    /// The body is only handed out for a `200 OK` response. Any other status
    /// is reported as [`Error::Api`] without reading the body.
    pub async fn send(&self) -> Result<GroupStream> {
        debug!(url = %self.url, identity = self.client.identity(), "requesting groups");

        let response = self
            .client
            .client()
            .get(&self.url)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.url, error = %e, "groups request failed");
                Error::Transport(e)
            })?;

        let status = response.status();
        debug!(url = %self.url, status = status.as_u16(), "groups response");
        if status != reqwest::StatusCode::OK {
            warn!(url = %self.url, status = status.as_u16(), "unexpected groups status");
            return Err(Error::api(status));
        }

        Ok(RecordStream::new(response))
    }

    /// Send the request and build the groups table from the whole body
    ///
    /// The response is released before this returns, whatever the outcome.
    pub async fn fetch_table(&self) -> Result<TableModel> {
        let mut stream = self.send().await?;
        let table = TableModel::from_stream(&mut stream).await?;
        debug!(
            rows = table.len(),
            bytes = stream.bytes_read(),
            "groups table built"
        );
        Ok(table)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::table::Value;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ROUTER: &str = r#"{"job_name":"router","link_name":"dns","link_type":"provides","group_id":42,"health_state":"running"}"#;
    const API: &str = r#"{"job_name":"api","link_name":"dns","link_type":"consumes","group_id":7,"health_state":"unhealthy"}"#;

    fn plain_client() -> SecuredClient {
        SecuredClient::from_client(reqwest::Client::new(), "api.bosh-dns")
    }

    async fn serve(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/groups"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_request_url() {
        let query = GroupQuery::new(plain_client(), "https://127.0.0.1:53080").unwrap();
        assert_eq!(query.request_url(), "https://127.0.0.1:53080/groups");

        let query = GroupQuery::new(plain_client(), " https://127.0.0.1:53080/ ").unwrap();
        assert_eq!(query.request_url(), "https://127.0.0.1:53080/groups");
    }

    #[test]
    fn test_empty_address_is_config_error() {
        let err = GroupQuery::new(plain_client(), "").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn test_fetch_two_groups() {
        let server = serve(200, &format!("{ROUTER}{API}")).await;
        let query = GroupQuery::new(plain_client(), &server.uri()).unwrap();

        let table = query.fetch_table().await.unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][3], Value::Int(42));
        assert_eq!(table.rows()[1][3], Value::Int(7));
    }

    #[tokio::test]
    async fn test_fetch_empty_body() {
        let server = serve(200, "").await;
        let query = GroupQuery::new(plain_client(), &server.uri()).unwrap();

        let table = query.fetch_table().await.unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_non_ok_status_is_api_error() {
        // A body that would decode fine must not be used
        let server = serve(503, ROUTER).await;
        let query = GroupQuery::new(plain_client(), &server.uri()).unwrap();

        match query.fetch_table().await.unwrap_err() {
            Error::Api { status, .. } => assert_eq!(status, 503),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_other_success_status_is_rejected() {
        let server = serve(204, "").await;
        let query = GroupQuery::new(plain_client(), &server.uri()).unwrap();

        let err = query.send().await.err().unwrap();
        assert!(matches!(err, Error::Api { status: 204, .. }));
    }

    #[tokio::test]
    async fn test_malformed_record_fails_whole_batch() {
        let server = serve(200, &format!("{ROUTER}\n{{\"job_name\":")).await;
        let query = GroupQuery::new(plain_client(), &server.uri()).unwrap();

        let err = query.fetch_table().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Decode(DecodeError::Truncated { index: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop a listener to get a port nobody is serving
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let query = GroupQuery::new(plain_client(), &format!("http://{addr}")).unwrap();
        let err = query.fetch_table().await.unwrap_err();
        assert!(matches!(err, Error::Transport(ref e) if e.is_connect()));
        assert_eq!(err.error_code(), "transport_connect");
    }

    #[tokio::test]
    async fn test_send_streams_lazily() {
        let server = serve(200, &format!("{ROUTER}\n{API}\n")).await;
        let query = GroupQuery::new(plain_client(), &server.uri()).unwrap();

        let mut stream = query.send().await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap().job_name, "router");
        assert_eq!(stream.next().await.unwrap().unwrap().job_name, "api");
        assert!(stream.next().await.unwrap().is_none());
        assert!(stream.is_closed());
    }
}
