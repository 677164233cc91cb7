//! Nexus Bridge Library

pub mod bridge;
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod protocol;
pub mod upstream;

pub use bridge::BridgeServer;
pub use config::schema::BridgeConfig;
pub use lifecycle::Shutdown;
