// ABOUTME: Binary entry point for the scrape relay HTTP service.
// ABOUTME: Loads Reddit credentials, builds the Relay, and serves the router until shutdown.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use scrape_relay::{init_logging, load_secrets, LogConfig, LogFormat, Relay, DEFAULT_SECRETS_FILE};
use scrape_relay_server::{router, AppState};

#[derive(Parser, Debug)]
#[command(name = "scrape-relay-server")]
#[command(about = "Serve POST /scrape for articles, Reddit threads, and YouTube transcripts")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "RELAY_BIND", default_value = "127.0.0.1:5000")]
    bind: String,

    /// Secrets file with the [REDDIT] credentials.
    #[arg(long, env = "RELAY_CONFIG", default_value = DEFAULT_SECRETS_FILE)]
    config: PathBuf,

    /// Allow fetching from private/local networks.
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,

    /// Log format on stderr: text or json.
    #[arg(long = "log-format", env = "RELAY_LOG_FORMAT", default_value = "text")]
    log_format: String,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(LogConfig {
        format: LogFormat::from(args.log_format.as_str()),
        default_filter: "info,tower_http=debug",
    })?;

    let secrets = load_secrets(&args.config)
        .with_context(|| format!("failed to load secrets from {}", args.config.display()))?;
    let relay = Relay::builder()
        .allow_private_networks(args.allow_private_networks)
        .build(secrets.reddit);

    let app = router(AppState::new(relay));
    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    tracing::info!(addr = %args.bind, "scrape relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}
