//! Core abstractions for the offline edge cache.
//!
//! This crate provides the fundamental types shared by the worker-side
//! snapshot cache and the page-side freshness cache:
//! - `WorkerConfig` - Version, asset manifest and routing configuration
//! - `Request` / `Response` - Platform fetch primitives
//! - `WorkerState` - Worker lifecycle state machine
//! - `KeepAlive` - Scoped keep-alive handles for event tasks
//! - `Clock` - Wall-clock abstraction for TTL evaluation

mod clock;
mod config;
mod context;
mod lifecycle;

pub use clock::*;
pub use config::*;
pub use context::*;
pub use lifecycle::*;
