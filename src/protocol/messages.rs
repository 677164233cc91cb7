//! Wire messages exchanged with the client and the validation backend.
//!
//! Field names are part of the contract with both peers and must not change.
//! Optional fields are omitted from the JSON rather than sent as `null`.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Request sent by the client over the inbound socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRequest {
    /// Wallet or node identifier.
    pub wallet_id: String,
    /// Optional free-text message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Correlation id, passed through untouched.
    pub tx_id: String,
}

/// Request forwarded to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamRequest {
    pub request_id: String,
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<String>,
    /// Seconds since epoch at send time.
    pub timestamp: u64,
}

/// Validation result produced by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamResponse {
    pub request_id: String,
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms_encrypted: Option<String>,
    pub verified: bool,
    pub signature: String,
    pub layers_used: u32,
    pub processing_time: u64,
    pub status: String,
    pub timestamp: u64,
}

/// Outcome reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Response written back to the client over the inbound socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientResponse {
    pub status: ResponseStatus,
    pub message: String,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<UpstreamResponse>,
    /// Milliseconds since epoch at send time.
    pub timestamp: i64,
}

impl ClientResponse {
    /// Generic failure response. Carries no backend detail.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
            verified: false,
            signature: None,
            data: None,
            timestamp: unix_millis(),
        }
    }

    /// Translate a backend response into the client-facing shape.
    pub fn success(response: UpstreamResponse) -> Self {
        let signature = Some(response.signature.clone()).filter(|s| !s.is_empty());
        Self {
            status: ResponseStatus::Success,
            message: response.status.clone(),
            verified: response.verified,
            signature,
            data: Some(response),
            timestamp: unix_millis(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

/// Seconds since the Unix epoch.
pub fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
