//! Network access for the edge cache controller.
//!
//! This crate provides:
//! - `Network` - The platform fetch seam
//! - `FetchClient` - Fetch with a total timeout
//! - `TimeoutConfig` - Timeout settings
//! - `InMemoryNetwork` - Scriptable network for development/testing

mod client;
mod memory;
mod timeout;

pub use client::*;
pub use memory::*;
pub use timeout::*;
