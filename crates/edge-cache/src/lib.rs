//! Caching infrastructure for the offline edge controller.
//!
//! This crate provides:
//! - `RequestKey` - Normalized request identity
//! - `SnapshotStorage` / `SnapshotStore` - Versioned response snapshots
//! - `SnapshotBackend` - Storage seam, with `InMemorySnapshots` for development/testing
//! - `RoutePolicy` - Per-request routing decision
//! - `CacheExplainHeaders` - Debug headers for cache behavior
//!
//! # Example
//!
//! ```ignore
//! use edge_cache::{RoutePolicy, RouteDecision};
//!
//! let policy = RoutePolicy::new()
//!     .with_api_segment("api")
//!     .with_backend_host("*.supabase.co");
//!
//! match policy.classify(&request, &origin) {
//!     RouteDecision::Bypass { reason } => { /* straight to network */ }
//!     RouteDecision::NetworkFirst => { /* third-party */ }
//!     RouteDecision::CacheFirst => { /* app shell asset */ }
//! }
//! ```

mod headers;
mod key;
mod policy;
mod snapshot;

pub use headers::*;
pub use key::*;
pub use policy::*;
pub use snapshot::*;
