use anyhow::{Context, Result};
use clap::Parser;
use modelproxy_core::config::{load_from_env, load_from_yaml};
use modelproxy_core::ModelAdapter;
use modelproxy_server::{app, AppState};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Relay chat requests to a configured text-generation backend
#[derive(Debug, Parser)]
#[command(name = "modelproxy", version, about)]
struct Cli {
    /// YAML configuration file; without it settings come from the environment
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_from_yaml(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => load_from_env().context("failed to read configuration from the environment")?,
    };

    let adapter = ModelAdapter::from_config(&config).context("failed to select model adapter")?;
    let state = AppState::new(adapter).with_channel_capacity(config.streaming.channel_capacity);

    let ip: IpAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.server.bind_address))?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("model proxy listening on http://{}", addr);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("model proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
