//! Worker errors.

use edge_cache::CacheError;
use edge_core::{ConfigError, WorkerState};
use edge_data::FetchError;

/// Result type for controller operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors raised by the edge cache controller.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// A manifest asset could not be snapshotted. Fatal to this version.
    #[error("install failed: asset {path} could not be fetched: {reason}")]
    InstallAssetFailure { path: String, reason: String },

    /// No snapshot entry and no shell fallback applied.
    #[error("request failed with no offline fallback: {0}")]
    Unresolved(#[from] FetchError),

    /// The lifecycle does not allow this step.
    #[error("invalid lifecycle transition {from} -> {to}")]
    InvalidTransition { from: WorkerState, to: WorkerState },

    /// The controller is not in a state that serves requests.
    #[error("worker is {0}, not activated")]
    NotActive(WorkerState),

    /// No version has been activated yet.
    #[error("no active worker")]
    NoController,

    #[error("snapshot storage error: {0}")]
    Cache(#[from] CacheError),

    /// Window clients or notification surface rejected a call.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
}

impl WorkerError {
    /// Whether the error ends the rollout of a version.
    pub fn is_install_failure(&self) -> bool {
        matches!(self, Self::InstallAssetFailure { .. })
    }
}

/// Errors from the host's client and notification surfaces.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("client not found: {0}")]
    ClientNotFound(String),

    #[error("window could not be opened: {0}")]
    OpenWindow(String),

    #[error("notification rejected: {0}")]
    Notification(String),
}
