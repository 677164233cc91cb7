//! Nexus Bridge
//!
//! Relays validation requests from a client process to a validation backend,
//! both reached over Unix domain sockets.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────┐
//!                         │                 NEXUS BRIDGE                  │
//!                         │                                               │
//!   Client request        │  ┌──────────┐   ┌───────────┐   ┌──────────┐  │
//!   ──────────────────────┼─▶│ listener │──▶│ admission │──▶│ handler  │  │
//!   (client socket)       │  │  (net)   │   │  (N max)  │   │ (bridge) │  │
//!                         │  └──────────┘   └───────────┘   └────┬─────┘  │
//!                         │                                      │        │
//!                         │                                      ▼        │
//!   Client response       │                               ┌────────────┐  │
//!   ◀─────────────────────┼───────────────────────────────│  upstream  │◀─┼──▶ Backend
//!                         │                               │  channel   │  │   (core socket)
//!                         │                               └────────────┘  │
//!                         │                                               │
//!                         │   config · observability · lifecycle          │
//!                         └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use nexus_bridge::config::{load_config, BridgeConfig};
use nexus_bridge::lifecycle::startup;
use nexus_bridge::observability::logging;

#[derive(Parser)]
#[command(name = "nexus-bridge")]
#[command(about = "Unix socket bridge between a client process and the validation backend", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(level) = args.log_level {
        config.observability.log_level = level;
    }

    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "nexus-bridge starting");
    tracing::info!(
        client_socket = %config.listener.socket_path,
        backend_socket = %config.upstream.socket_path,
        max_concurrent_handlers = config.listener.max_concurrent_handlers,
        "Configuration loaded"
    );

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
