use clap::Parser;
use jobconnect_client::client::cli_client::CliClient;
use jobconnect_client::client::config::ClientConfig;
use jobconnect_client::utils::logger;

/// Terminal client for the job marketplace.
#[derive(Debug, Parser)]
#[command(name = "jobconnect-cli", version, about)]
struct Args {
    /// REST backend base URL (overrides API_BASE_URL)
    #[arg(long)]
    api_url: Option<String>,
    /// Backend port override (overrides API_PORT)
    #[arg(long)]
    port: Option<u16>,
    /// Real-time endpoint (overrides WEBSOCKET_URL)
    #[arg(long)]
    ws_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // load environment from .env (optional)
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    logger::init(&ClientConfig::log_level_from_env());

    let config = ClientConfig::from_env().with_overrides(args.api_url.as_deref(), args.port, args.ws_url.as_deref());
    CliClient::new(&config).run().await
}
