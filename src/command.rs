//! The `groups` command: query, decode, tabulate, render

use crate::config::Config;
use crate::error::Result;
use crate::query::GroupQuery;
use crate::render::Renderer;
use crate::tls::SecureClientFactory;
use tracing::info;

/// Runs the groups pipeline once
///
/// Each stage returns its first error unchanged and nothing is rendered
/// unless the whole table was built.
pub struct GroupsCommand<F, R> {
    config: Config,
    factory: F,
    renderer: R,
}

impl<F: SecureClientFactory, R: Renderer> GroupsCommand<F, R> {
    /// Create the command
    pub fn new(config: Config, factory: F, renderer: R) -> Self {
        Self {
            config,
            factory,
            renderer,
        }
    }

    /// Execute the command
    ///
    /// # Errors
    /// - [`Error::Config`](crate::Error::Config) for invalid configuration or
    ///   certificate material; no request is sent
    /// - [`Error::Transport`](crate::Error::Transport) if the API is unreachable
    /// - [`Error::Api`](crate::Error::Api) for a non-200 response
    /// - [`Error::Decode`](crate::Error::Decode) for a malformed body
    /// - [`Error::Io`](crate::Error::Io) if the output cannot be written
    pub async fn execute(&mut self) -> Result<()> {
        self.config.validate()?;

        let client = self.factory.build(
            &self.config.server_name,
            &self.config.tls,
            self.config.timeout,
        )?;
        let query = GroupQuery::new(client, &self.config.api_address)?;

        let table = query.fetch_table().await?;
        info!(rows = table.len(), url = query.request_url(), "rendering groups");
        self.renderer.render_table(&table)
    }

    /// Give back the renderer
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
