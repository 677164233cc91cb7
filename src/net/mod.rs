//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Unix socket connection
//!     → listener.rs (accept, assign connection ID)
//!     → connection.rs (lifecycle tracking for shutdown drain)
//!     → admission.rs (wait for one of N processing slots)
//!     → Hand off to bridge handler
//! ```
//!
//! # Design Decisions
//! - Accept is never throttled; processing is
//! - Slots are RAII permits, released on every exit path

pub mod admission;
pub mod connection;
pub mod listener;

pub use admission::{AdmissionGate, AdmissionPermit};
pub use connection::{ConnectionId, ConnectionTracker};
pub use listener::{Listener, ListenerError};
