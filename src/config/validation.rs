//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (buffer sizes > 0, handler count > 0)
//! - Detect conflicting socket paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::BridgeConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "json"];

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyPath(&'static str),

    #[error("listener and upstream share socket path {0}")]
    SocketPathConflict(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("protocol.failure_message must not be empty")]
    EmptyFailureMessage,

    #[error("unknown log level '{0}'")]
    LogLevel(String),

    #[error("unknown log format '{0}'")]
    LogFormat(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.socket_path.is_empty() {
        errors.push(ValidationError::EmptyPath("listener.socket_path"));
    }
    if config.upstream.socket_path.is_empty() {
        errors.push(ValidationError::EmptyPath("upstream.socket_path"));
    }
    if !config.listener.socket_path.is_empty()
        && config.listener.socket_path == config.upstream.socket_path
    {
        errors.push(ValidationError::SocketPathConflict(
            config.listener.socket_path.clone(),
        ));
    }

    if config.listener.max_concurrent_handlers == 0 {
        errors.push(ValidationError::Zero("listener.max_concurrent_handlers"));
    }
    if config.listener.buffer_size == 0 {
        errors.push(ValidationError::Zero("listener.buffer_size"));
    }
    if config.upstream.buffer_size == 0 {
        errors.push(ValidationError::Zero("upstream.buffer_size"));
    }
    if config.protocol.max_message_len == 0 {
        errors.push(ValidationError::Zero("protocol.max_message_len"));
    }
    if config.protocol.failure_message.is_empty() {
        errors.push(ValidationError::EmptyFailureMessage);
    }

    let obs = &config.observability;
    if !LOG_LEVELS.contains(&obs.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(obs.log_level.clone()));
    }
    if !LOG_FORMATS.contains(&obs.log_format.as_str()) {
        errors.push(ValidationError::LogFormat(obs.log_format.clone()));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(obs.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
