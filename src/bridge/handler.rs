//! Per-connection request/response protocol.
//!
//! # Connection States
//! ```text
//! Accepted → Reading → Empty → Responding(error) → Closed
//!                    → ParseFailed → Responding(error) → Closed
//!                    → ParseOk → Normalizing → Forwarding → ExchangeFailed → Responding(error) → Closed
//!                                                         → ExchangeOk → Responding(success) → Closed
//! Queued at shutdown → Refused → Responding(error) → Closed
//! ```
//!
//! Every path writes exactly one response and then closes. There is no
//! keep-alive and no retry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::{ListenerConfig, ProtocolConfig};
use crate::observability::metrics;
use crate::protocol::{to_upstream, ClientRequest, ClientResponse};
use crate::upstream::UpstreamChannel;

/// How long `reject` waits for a pending request before answering.
const REJECT_DRAIN: Duration = Duration::from_millis(50);

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Backend answered; success response written.
    Forwarded,
    /// Client sent something that is not a ClientRequest.
    Rejected,
    /// Client closed without sending anything, e.g. a liveness check.
    Empty,
    /// Turned away at the admission gate during shutdown.
    Refused,
    /// Exchange with the backend failed.
    UpstreamFailed,
}

impl HandlerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerOutcome::Forwarded => "success",
            HandlerOutcome::Rejected => "invalid_request",
            HandlerOutcome::Empty => "empty",
            HandlerOutcome::Refused => "shutting_down",
            HandlerOutcome::UpstreamFailed => "upstream_error",
        }
    }
}

/// Handles one client connection end to end.
#[derive(Debug, Clone)]
pub struct BridgeHandler {
    upstream: Arc<UpstreamChannel>,
    buffer_size: usize,
    max_message_len: usize,
    failure_message: Arc<str>,
}

impl BridgeHandler {
    pub fn new(
        upstream: Arc<UpstreamChannel>,
        listener: &ListenerConfig,
        protocol: &ProtocolConfig,
    ) -> Self {
        Self {
            upstream,
            buffer_size: listener.buffer_size,
            max_message_len: protocol.max_message_len,
            failure_message: Arc::from(protocol.failure_message.as_str()),
        }
    }

    /// Read one request, answer it, close the stream.
    pub async fn handle<S>(&self, mut stream: S) -> HandlerOutcome
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let start = Instant::now();
        let (outcome, response) = self.process(&mut stream).await;
        self.respond(stream, outcome, &response, start).await
    }

    /// Answer a connection that will never be processed with the generic
    /// failure response.
    ///
    /// Any request already queued on the stream is read and discarded first;
    /// closing a Unix socket with unread input resets the peer.
    pub async fn reject<S>(&self, mut stream: S) -> HandlerOutcome
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let start = Instant::now();
        let mut buffer = vec![0u8; self.buffer_size];
        let _ = tokio::time::timeout(REJECT_DRAIN, stream.read(&mut buffer)).await;

        let response = self.failure();
        self.respond(stream, HandlerOutcome::Refused, &response, start)
            .await
    }

    async fn respond<S>(
        &self,
        mut stream: S,
        outcome: HandlerOutcome,
        response: &ClientResponse,
        start: Instant,
    ) -> HandlerOutcome
    where
        S: AsyncWrite + Unpin,
    {
        match serde_json::to_vec(response) {
            Ok(bytes) => {
                if let Err(e) = stream.write_all(&bytes).await {
                    tracing::debug!(error = %e, "Failed to write response to client");
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode client response"),
        }
        let _ = stream.shutdown().await;

        metrics::record_request(outcome.as_str(), start);
        outcome
    }

    async fn process<S>(&self, stream: &mut S) -> (HandlerOutcome, ClientResponse)
    where
        S: AsyncRead + Unpin,
    {
        // One read; anything past the buffer is cut off by the read itself.
        let mut buffer = vec![0u8; self.buffer_size];
        let n = match stream.read(&mut buffer).await {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read from client");
                0
            }
        };

        if n == 0 {
            tracing::debug!("Client closed without sending a request");
            return (HandlerOutcome::Empty, self.failure());
        }

        let request: ClientRequest = match serde_json::from_slice(&buffer[..n]) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, bytes = n, "Invalid JSON from client");
                return (HandlerOutcome::Rejected, self.failure());
            }
        };

        tracing::info!(
            wallet_id = %request.wallet_id,
            tx_id = %request.tx_id,
            "Validation request received"
        );

        let upstream_request = to_upstream(&request, self.max_message_len);

        match self.upstream.exchange(&upstream_request).await {
            Ok(response) => {
                tracing::info!(
                    wallet_id = %request.wallet_id,
                    verified = response.verified,
                    sms_encrypted = response.sms_encrypted.is_some(),
                    status = %response.status,
                    "Forwarded backend response"
                );
                (HandlerOutcome::Forwarded, ClientResponse::success(response))
            }
            Err(e) => {
                tracing::warn!(
                    wallet_id = %request.wallet_id,
                    error = %e,
                    "Validation failed"
                );
                (HandlerOutcome::UpstreamFailed, self.failure())
            }
        }
    }

    fn failure(&self) -> ClientResponse {
        ClientResponse::failure(self.failure_message.as_ref())
    }
}
