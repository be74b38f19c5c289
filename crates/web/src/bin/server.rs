//! Netmotif Web Server Binary
//!
//! Standalone binary running the analysis API and WebSocket channel.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use netmotif_web::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "netmotif-server", version, about = "Graph analysis server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overriding the configuration
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,netmotif_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    }
    .with_env_overrides();
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }

    tracing::info!("Starting Netmotif server");
    tracing::info!("API: http://{}/api", config.server.bind_address);

    netmotif_web::serve(config).await.context("server failed")?;
    Ok(())
}
