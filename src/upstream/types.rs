//! Upstream error definitions.

use std::io;

use thiserror::Error;

/// Errors that can occur while talking to the validation backend.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Backend socket could not be reached.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Request could not be written in full.
    #[error("failed to write request: {0}")]
    Write(#[source] io::Error),

    /// Response could not be read.
    #[error("failed to read response: {0}")]
    Read(#[source] io::Error),

    /// Backend hung up before answering.
    #[error("backend closed the connection")]
    Closed,

    /// Request could not be encoded.
    #[error("failed to encode request: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Backend answered with something that is not an UpstreamResponse.
    #[error("malformed backend response: {0}")]
    Deserialize(#[source] serde_json::Error),
}

impl UpstreamError {
    /// Whether the channel must be dropped and redialed on next use.
    pub fn invalidates_channel(&self) -> bool {
        !matches!(self, UpstreamError::Serialize(_))
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Connect { .. } => "connect",
            UpstreamError::Write(_) => "write",
            UpstreamError::Read(_) => "read",
            UpstreamError::Closed => "closed",
            UpstreamError::Serialize(_) => "serialize",
            UpstreamError::Deserialize(_) => "deserialize",
        }
    }
}

/// Result type for upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;
