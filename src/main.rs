//! Adaptive WebP image server.
//!
//! Serves `<source>.webp` derivatives of images stored under per-host
//! docroots, sized and compressed for the requesting client.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │               ADAPTIVE WEBP                   │
//!                        │                                               │
//!     Client Request     │  ┌─────────┐    ┌─────────┐    ┌──────────┐   │
//!     ───────────────────┼─▶│  http   │───▶│ routing │───▶│ imaging  │   │
//!                        │  │ server  │    │ hostmap │    │  source  │   │
//!                        │  └─────────┘    └─────────┘    └────┬─────┘   │
//!                        │                                     │         │
//!                        │                 ┌─────────────┐     ▼         │
//!                        │                 │ negotiation │──▶ adapter    │
//!                        │                 │ hints/query │     │         │
//!                        │                 └─────────────┘     │         │
//!     Client Response    │  ┌─────────┐                        │         │
//!     ◀──────────────────┼──│response │◀───────────────────────┘         │
//!                        │  └─────────┘                                  │
//!                        │                                               │
//!                        │  config (live snapshot) · lifecycle · observability
//!                        └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use adaptive_webp::config::watcher::ConfigWatcher;
use adaptive_webp::config::{load_config, validate_config, ConfigError, ConfigSources, LiveConfig};
use adaptive_webp::imaging::RasterTransform;
use adaptive_webp::lifecycle::{spawn_reloader, spawn_signal_handler, Shutdown};
use adaptive_webp::observability::{logging, metrics};
use adaptive_webp::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "adaptive-webp", version, about = "Adaptive WebP image server")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing the .env files.
    #[arg(long, default_value = ".")]
    env_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let sources = ConfigSources::new(cli.config, cli.env_dir);

    let config = load_config(&sources)?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!("adaptive-webp v{} starting", env!("CARGO_PKG_VERSION"));

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        app_env = %sources.app_env,
        content_negotiation = config.delivery.content_negotiation,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        match addr.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(metrics_address = %addr, error = %e, "Failed to parse metrics address"),
        }
    }

    let bind_address = config.listener.bind_address();
    let live = Arc::new(LiveConfig::new(config));
    if live.load().routes.is_empty() {
        tracing::warn!("HOSTMAP is empty; every request will be answered with 404");
    }

    let listener = TcpListener::bind(bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let hangups = spawn_signal_handler(shutdown.clone());

    let (watcher, updates) = ConfigWatcher::new(sources.clone());
    let _watcher = match watcher.run() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Config watcher unavailable; reload with SIGHUP");
            None
        }
    };
    let reloader = spawn_reloader(live.clone(), sources, updates, hangups, shutdown.subscribe());

    let server = HttpServer::new(live, Arc::new(RasterTransform));
    server.run(listener, shutdown.subscribe()).await?;

    shutdown.trigger();
    let _ = reloader.await;

    tracing::info!("Shutdown complete");
    Ok(())
}
