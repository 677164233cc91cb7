//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Init metrics → Bind socket → Dial backend (best effort) → Accept
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain handlers → Remove socket file
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
