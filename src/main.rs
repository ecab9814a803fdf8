use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use dns_groups::{
    Config, Error, GroupsCommand, JsonRenderer, MutualTlsClientFactory, Renderer, TextRenderer,
    TlsConfig,
};
use tracing_subscriber::EnvFilter;

/// Show instance-group health reported by the DNS health API
#[derive(Debug, Parser)]
#[command(name = "dns-groups", version, about)]
struct Cli {
    /// API address to talk to
    #[arg(long = "api", env = "DNS_API_ADDRESS", value_name = "URL")]
    api: String,

    /// CA certificate to use for mutual TLS
    #[arg(long, env = "DNS_API_TLS_CA_CERT_PATH", value_name = "PATH", default_value = "")]
    ca_cert_path: String,

    /// Client certificate to use for mutual TLS
    #[arg(long, env = "DNS_API_TLS_CERTIFICATE_PATH", value_name = "PATH", default_value = "")]
    certificate_path: String,

    /// Client key to use for mutual TLS
    #[arg(long, env = "DNS_API_TLS_PRIVATE_KEY_PATH", value_name = "PATH", default_value = "")]
    private_key_path: String,

    /// Identity name of the API
    #[arg(long, env = "DNS_API_SERVER_NAME", default_value = dns_groups::config::DEFAULT_SERVER_NAME)]
    server_name: String,

    /// Request timeout in seconds
    #[arg(long, env = "DNS_API_TIMEOUT", value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Print the table as JSON
    #[arg(long)]
    json: bool,

    /// Log filter (e.g. "debug", "dns_groups=trace")
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            api_address: self.api.clone(),
            tls: TlsConfig {
                ca_cert_path: self.ca_cert_path.clone().into(),
                certificate_path: self.certificate_path.clone().into(),
                private_key_path: self.private_key_path.clone().into(),
            },
            server_name: self.server_name.clone(),
            timeout: self.timeout.map(Duration::from_secs),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = if cli.json {
        run(&cli, JsonRenderer::new(std::io::stdout())).await
    } else {
        run(&cli, TextRenderer::new(std::io::stdout())).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {} failed: {}", e.stage(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run<R: Renderer>(cli: &Cli, renderer: R) -> Result<(), Error> {
    GroupsCommand::new(cli.config(), MutualTlsClientFactory, renderer)
        .execute()
        .await
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
