//! Page-side freshness cache.
//!
//! Memoizes fetched payloads in synchronous key/value storage under a
//! private namespace, stamped with the time they were written.
//!
//! # Example
//!
//! ```rust,ignore
//! use edge_freshness::{FreshnessCache, Invalidate, MemoryStorage};
//!
//! let cache = FreshnessCache::new(MemoryStorage::new());
//!
//! if !cache.is_fresh("sleep:weekly") {
//!     let stats = fetch_weekly_stats().await?;
//!     cache.set("sleep:weekly", &stats);
//! }
//! let stats: Option<WeeklyStats> = cache.get("sleep:weekly");
//!
//! // After logging a new night
//! cache.invalidate(Invalidate::All);
//! ```

mod error;
mod freshness;
mod kv;

pub use error::StorageError;
pub use freshness::{FreshnessCache, Invalidate, Lookup, NAMESPACE_PREFIX, TTL};
pub use kv::{KeyValueStorage, MemoryStorage};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FreshnessCache, Invalidate, KeyValueStorage, MemoryStorage};
}
