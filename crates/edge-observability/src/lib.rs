//! Observability infrastructure for the offline edge cache.
//!
//! This crate provides:
//! - `EventLog` - Structured records for each worker event
//! - `WorkerMetrics` - Counters for cache outcomes and lifecycle events

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;

// Re-export RequestId from edge-core for convenience
pub use edge_core::RequestId;
