//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! listener, handler, upstream channel, admission gate
//!     → logging.rs (tracing events, pretty or JSON on stdout)
//!     → metrics.rs (request outcomes, exchange latency, dial results, slots)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Prometheus scrape (only when metrics_enabled)
//! ```
//!
//! # Design Decisions
//! - Each connection runs inside a `connection` span carrying its id
//! - Metric recording without an installed exporter is a no-op

pub mod logging;
pub mod metrics;
