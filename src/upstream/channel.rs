//! Shared duplex channel to the validation backend.
//!
//! # Responsibilities
//! - Dial the backend lazily and redial after any I/O failure
//! - Serialize exchanges: one request in flight at a time
//! - Never retry a failed exchange
//!
//! # Channel States
//! ```text
//! Unconnected → Connected → (I/O error) → Unconnected → dial on next use
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::sync::Mutex;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::protocol::{UpstreamRequest, UpstreamResponse};
use crate::upstream::types::{UpstreamError, UpstreamResult};

/// Single persistent connection to the backend, guarded by one lock.
///
/// The lock is held for the whole of an exchange, so exchanges are totally
/// ordered no matter how many handlers share the channel.
#[derive(Debug)]
pub struct UpstreamChannel {
    socket_path: PathBuf,
    buffer_size: usize,
    stream: Mutex<Option<UnixStream>>,
}

impl UpstreamChannel {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self::with_path(&config.socket_path, config.buffer_size)
    }

    pub fn with_path(socket_path: impl AsRef<Path>, buffer_size: usize) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            buffer_size,
            stream: Mutex::new(None),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Dial the backend if no channel is open. No-op when already connected.
    pub async fn ensure_connected(&self) -> UpstreamResult<()> {
        let mut slot = self.stream.lock().await;
        if slot.is_none() {
            *slot = Some(self.dial().await?);
        }
        Ok(())
    }

    /// Close any open channel and dial a fresh one.
    pub async fn reconnect(&self) -> UpstreamResult<()> {
        let mut slot = self.stream.lock().await;
        if let Some(mut stale) = slot.take() {
            let _ = stale.shutdown().await;
        }
        *slot = Some(self.dial().await?);
        Ok(())
    }

    /// Whether a channel is currently held. Waits for any in-flight exchange.
    pub async fn is_connected(&self) -> bool {
        self.stream.lock().await.is_some()
    }

    /// Send one request and wait for its response.
    ///
    /// On failure the channel is dropped so the next call redials; the failed
    /// request itself is not retried.
    pub async fn exchange(&self, request: &UpstreamRequest) -> UpstreamResult<UpstreamResponse> {
        let mut slot = self.stream.lock().await;
        let start = Instant::now();

        let result = self.exchange_locked(&mut slot, request).await;

        match &result {
            Ok(response) => {
                metrics::record_exchange("ok", start);
                let signature_prefix: String = response.signature.chars().take(20).collect();
                tracing::debug!(
                    request_id = %request.request_id,
                    elapsed_us = start.elapsed().as_micros() as u64,
                    verified = response.verified,
                    signature = %signature_prefix,
                    sms_encrypted = response.sms_encrypted.is_some(),
                    "Backend response received"
                );
            }
            Err(e) => {
                metrics::record_exchange(e.kind(), start);
                if e.invalidates_channel() && slot.take().is_some() {
                    tracing::warn!(
                        request_id = %request.request_id,
                        error = %e,
                        "Upstream channel dropped, will redial on next use"
                    );
                }
            }
        }

        result
    }

    async fn exchange_locked(
        &self,
        slot: &mut Option<UnixStream>,
        request: &UpstreamRequest,
    ) -> UpstreamResult<UpstreamResponse> {
        let payload = serde_json::to_vec(request).map_err(UpstreamError::Serialize)?;

        let stream = match slot.take() {
            Some(stream) => slot.insert(stream),
            None => slot.insert(self.dial().await?),
        };

        stream.write_all(&payload).await.map_err(UpstreamError::Write)?;

        let mut buffer = vec![0u8; self.buffer_size];
        let n = stream.read(&mut buffer).await.map_err(UpstreamError::Read)?;
        if n == 0 {
            return Err(UpstreamError::Closed);
        }

        serde_json::from_slice(&buffer[..n]).map_err(UpstreamError::Deserialize)
    }

    async fn dial(&self) -> UpstreamResult<UnixStream> {
        match UnixStream::connect(&self.socket_path).await {
            Ok(stream) => {
                metrics::record_connect(true);
                tracing::info!(path = %self.socket_path.display(), "Connected to backend");
                Ok(stream)
            }
            Err(source) => {
                metrics::record_connect(false);
                Err(UpstreamError::Connect {
                    path: self.socket_path.display().to_string(),
                    source,
                })
            }
        }
    }
}
