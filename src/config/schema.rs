//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Inbound (client-facing) socket settings.
    pub listener: ListenerConfig,

    /// Outbound (backend-facing) socket settings.
    pub upstream: UpstreamConfig,

    /// Request normalization and client-facing response settings.
    pub protocol: ProtocolConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Inbound listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Filesystem path of the client-facing socket.
    pub socket_path: String,

    /// Permission bits applied to the socket file after binding.
    pub socket_mode: u32,

    /// Maximum number of client connections processed at once.
    pub max_concurrent_handlers: usize,

    /// Size of the single read performed per client connection.
    pub buffer_size: usize,

    /// How long shutdown waits for in-flight handlers, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            socket_path: "/tmp/xyron-go.sock".to_string(),
            socket_mode: 0o777,
            max_concurrent_handlers: 4,
            buffer_size: 64 * 1024,
            shutdown_grace_secs: 5,
        }
    }
}

/// Upstream (validation backend) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Filesystem path of the backend socket.
    pub socket_path: String,

    /// Size of the single read performed per exchange.
    pub buffer_size: usize,

    /// Dial the backend before accepting clients (failure is not fatal).
    pub connect_on_startup: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            socket_path: "/tmp/xyron-core.sock".to_string(),
            buffer_size: 64 * 1024,
            connect_on_startup: true,
        }
    }
}

/// Protocol-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Maximum forwarded message length in bytes.
    pub max_message_len: usize,

    /// Message returned to the client on every failure path.
    pub failure_message: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_message_len: 160,
            failure_message: "PIP PIP".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
