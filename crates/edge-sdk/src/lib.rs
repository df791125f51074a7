//! Public SDK for the offline edge cache.
//!
//! This crate re-exports both halves of the offline layer:
//!
//! ```ignore
//! use edge_sdk::prelude::*;
//!
//! // Worker side
//! let registration = Registration::new(platform);
//! registration.update(WorkerConfig::load("edge.toml")?).await?;
//! let served = registration.fetch(Request::navigate(url)?).await?;
//!
//! // Page side
//! let cache = FreshnessCache::new(storage);
//! if !cache.is_fresh("sleep:weekly") {
//!     cache.set("sleep:weekly", &fetch_weekly().await?);
//! }
//! ```

pub use edge_cache;
pub use edge_core;
pub use edge_data;
pub use edge_freshness;
pub use edge_observability;
pub use edge_worker;

/// Prelude for convenient imports.
pub mod prelude {
    pub use edge_cache::*;
    pub use edge_core::*;
    pub use edge_data::*;
    pub use edge_freshness::prelude::*;
    pub use edge_observability::*;
    pub use edge_worker::*;
}
