//! Bridge server: accept loop and handler dispatch.
//!
//! # Responsibilities
//! - Bind the client-facing socket
//! - Dial the backend once up front (failure is not fatal)
//! - Spawn one task per accepted connection, gated by admission
//! - Stop accepting on shutdown and drain in-flight handlers
//! - Answer connections still queued after the grace period with a failure

use std::sync::Arc;
use std::time::Duration;

use tokio::net::UnixStream;
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::bridge::handler::BridgeHandler;
use crate::config::BridgeConfig;
use crate::net::{AdmissionGate, ConnectionId, ConnectionTracker, Listener, ListenerError};
use crate::upstream::UpstreamChannel;

/// The bridge between the client socket and the validation backend.
pub struct BridgeServer {
    config: BridgeConfig,
    upstream: Arc<UpstreamChannel>,
    gate: AdmissionGate,
    tracker: ConnectionTracker,
    handler: BridgeHandler,
}

impl BridgeServer {
    /// Create a new server with the given configuration.
    pub fn new(config: BridgeConfig) -> Self {
        let upstream = Arc::new(UpstreamChannel::new(&config.upstream));
        let gate = AdmissionGate::new(config.listener.max_concurrent_handlers);
        let handler = BridgeHandler::new(upstream.clone(), &config.listener, &config.protocol);

        Self {
            config,
            upstream,
            gate,
            tracker: ConnectionTracker::new(),
            handler,
        }
    }

    /// Bind the client-facing socket. The only fatal startup step.
    pub fn bind(&self) -> Result<Listener, ListenerError> {
        Listener::bind(&self.config.listener)
    }

    /// Accept connections on `listener` until shutdown is signalled.
    pub async fn run(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) {
        if self.config.upstream.connect_on_startup {
            if let Err(e) = self.upstream.ensure_connected().await {
                tracing::warn!(error = %e, "Backend not reachable yet, will connect on demand");
            }
        }

        tracing::info!(
            path = %listener.path().display(),
            backend = %self.upstream.socket_path().display(),
            max_concurrent_handlers = self.gate.capacity(),
            "Bridge ready"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, id)) => self.dispatch(stream, id),
                    Err(e) => tracing::error!(error = %e, "Accept error"),
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
            }
        }

        let grace = Duration::from_secs(self.config.listener.shutdown_grace_secs);
        if !self.tracker.wait_for_drain(grace).await {
            tracing::warn!(
                remaining = self.tracker.active_count(),
                "Handlers still running after shutdown grace period"
            );
        }
        self.gate.close();
        listener.remove_socket_file();

        tracing::info!("Bridge stopped");
    }

    fn dispatch(&self, stream: UnixStream, id: ConnectionId) {
        let guard = self.tracker.track(id);
        let gate = self.gate.clone();
        let handler = self.handler.clone();
        let span = tracing::info_span!("connection", id = %id);

        tokio::spawn(
            async move {
                let _guard = guard;
                let Some(_permit) = gate.acquire().await else {
                    tracing::debug!("Admission closed, refusing queued connection");
                    handler.reject(stream).await;
                    return;
                };
                let outcome = handler.handle(stream).await;
                tracing::debug!(outcome = outcome.as_str(), "Connection finished");
            }
            .instrument(span),
        );
    }

    /// Admission gate used for every handler.
    pub fn admission(&self) -> AdmissionGate {
        self.gate.clone()
    }
}
