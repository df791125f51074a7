//! Storage error types.

use thiserror::Error;

/// Errors raised by a key/value storage backend.
///
/// [`FreshnessCache`](crate::FreshnessCache) never returns these; they are
/// logged and collapsed into a miss or a no-op.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Storage is disabled or not reachable (private mode, blocked by policy).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Writing the value would exceed the storage quota.
    #[error("Quota exceeded writing {key} ({bytes} bytes)")]
    QuotaExceeded { key: String, bytes: usize },

    /// Failed to serialize or parse a stored value.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Stored value is JSON but not a `{ data, timestamp }` record.
    #[error("Malformed record: {0}")]
    Malformed(String),
}
