//! Edge cache controller.
//!
//! This crate runs the worker side of the offline layer:
//! - `Registration` - Owns the active version and rolls out updates
//! - `EdgeController` - Install, activate, fetch, push and notification click
//! - `FallbackChain` - Offline fallbacks for failed network requests
//! - `PushPayload` - Push message validation
//! - `Platform` - Host surfaces (network, snapshot storage, windows, notifications)
//!
//! # Example
//!
//! ```ignore
//! use edge_worker::{InMemoryPlatform, Registration};
//!
//! let host = InMemoryPlatform::new(network, InMemoryClients::new());
//! let registration = Registration::new(host.platform());
//! registration.update(config).await?;
//!
//! let served = registration.fetch(Request::navigate("https://app.example.com/stats")?).await?;
//! println!("{}", served.status);
//! ```

mod clients;
mod controller;
mod error;
mod fallback;
mod notification;
mod platform;
mod push;
mod registration;

pub use clients::*;
pub use controller::*;
pub use error::*;
pub use fallback::*;
pub use notification::*;
pub use platform::*;
pub use push::*;
pub use registration::*;
