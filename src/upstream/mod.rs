//! Upstream (validation backend) subsystem.
//!
//! # Data Flow
//! ```text
//! Handler
//!     → channel.rs (lock, dial if needed, write request, read response)
//!     → types.rs (errors that drop the channel)
//!     → Handler
//! ```
//!
//! # Design Decisions
//! - One shared connection instead of a pool; exchanges are serialized
//! - No timeouts and no retries: a failed exchange is reported as-is
//! - The channel is an owned value shared through `Arc`, not a global

pub mod channel;
pub mod types;

pub use channel::UpstreamChannel;
pub use types::{UpstreamError, UpstreamResult};
