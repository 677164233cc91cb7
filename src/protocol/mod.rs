//! Bridge wire protocol.
//!
//! # Data Flow
//! ```text
//! Client bytes
//!     → messages.rs (ClientRequest)
//!     → normalize.rs (truncate message, build UpstreamRequest)
//!     → [upstream exchange]
//!     → messages.rs (UpstreamResponse → ClientResponse)
//!     → Client bytes
//! ```
//!
//! Both sockets carry one newline-free JSON document per read/write.

pub mod messages;
pub mod normalize;

pub use messages::{ClientRequest, ClientResponse, ResponseStatus, UpstreamRequest, UpstreamResponse};
pub use normalize::{to_upstream, truncate_message};
