//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize metrics when enabled
//! - Bind the client-facing socket (fatal on failure)
//! - Hook termination signals into shutdown
//! - Serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: only a bind failure aborts startup
//! - The backend may be down at startup; it is dialed on demand

use std::net::SocketAddr;
use std::sync::Arc;

use crate::bridge::BridgeServer;
use crate::config::BridgeConfig;
use crate::lifecycle::{signals, Shutdown};
use crate::net::ListenerError;
use crate::observability::metrics;

/// Run the bridge with `config` until SIGINT/SIGTERM.
pub async fn run(config: BridgeConfig) -> Result<(), ListenerError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = BridgeServer::new(config);
    let listener = server.bind()?;

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    server.run(listener, server_shutdown).await;
    Ok(())
}
