//! Bridge subsystem.
//!
//! # Data Flow
//! ```text
//! server.rs (accept loop)
//!     → admission gate (one of N slots)
//!     → handler.rs (read → parse → normalize → exchange → translate → respond)
//!     → slot released, connection closed
//! ```

pub mod handler;
pub mod server;

pub use handler::{BridgeHandler, HandlerOutcome};
pub use server::BridgeServer;
