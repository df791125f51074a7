//! Versioned snapshot stores.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use edge_core::Response;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::key::RequestKey;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache operation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The named store does not exist (never opened, or pruned).
    #[error("snapshot store not found: {0}")]
    StoreNotFound(String),

    /// Backend storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// How a response was produced, for logs, metrics and explain headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from the current snapshot store.
    Hit,
    /// Store miss answered by the network.
    Miss,
    /// Network-first request answered by the network.
    Network,
    /// Not intercepted; straight network.
    Bypass,
    /// Network failed; a stored entry was served instead.
    Fallback,
    /// Network failed on a navigation; the root document was served.
    Shell,
}

impl CacheStatus {
    /// Whether the body came from the snapshot store.
    pub fn is_from_snapshot(&self) -> bool {
        matches!(self, Self::Hit | Self::Fallback | Self::Shell)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Network => write!(f, "NETWORK"),
            Self::Bypass => write!(f, "BYPASS"),
            Self::Fallback => write!(f, "FALLBACK"),
            Self::Shell => write!(f, "SHELL"),
        }
    }
}

/// Snapshot storage backend trait.
///
/// Each call is atomic on its own. Nothing orders calls from different tasks,
/// so concurrent `put`s to the same key are last-write-wins.
#[async_trait]
pub trait SnapshotBackend: Send + Sync {
    /// Create the named store if it does not exist.
    async fn open(&self, name: &str) -> CacheResult<()>;

    /// Names of all stores.
    async fn names(&self) -> CacheResult<Vec<String>>;

    /// Delete a store. Returns whether it existed.
    async fn delete(&self, name: &str) -> CacheResult<bool>;

    /// Look up a response in one store.
    async fn get(&self, name: &str, key: &RequestKey) -> CacheResult<Option<Response>>;

    /// Store one response.
    async fn put(&self, name: &str, key: RequestKey, response: Response) -> CacheResult<()>;

    /// Store a batch of responses; either all are written or none.
    async fn put_all(&self, name: &str, entries: Vec<(RequestKey, Response)>) -> CacheResult<()>;

    /// Keys held by one store.
    async fn keys(&self, name: &str) -> CacheResult<Vec<RequestKey>>;
}

/// Entry point to all snapshot stores, addressed by version identifier.
#[derive(Clone)]
pub struct SnapshotStorage {
    backend: Arc<dyn SnapshotBackend>,
}

impl SnapshotStorage {
    /// Wrap a backend.
    pub fn new(backend: Arc<dyn SnapshotBackend>) -> Self {
        Self { backend }
    }

    /// Open (or create) the store for a version.
    pub async fn open(&self, version: &str) -> CacheResult<SnapshotStore> {
        self.backend.open(version).await?;
        Ok(self.store(version))
    }

    /// Handle to a store without creating it. Reads of a missing store miss;
    /// writes fail with [`CacheError::StoreNotFound`].
    pub fn store(&self, version: &str) -> SnapshotStore {
        SnapshotStore {
            backend: Arc::clone(&self.backend),
            name: version.to_string(),
        }
    }

    /// Names of all stores.
    pub async fn names(&self) -> CacheResult<Vec<String>> {
        self.backend.names().await
    }

    /// Whether a store exists.
    pub async fn has(&self, version: &str) -> CacheResult<bool> {
        Ok(self.names().await?.iter().any(|n| n == version))
    }

    /// Delete a store.
    pub async fn delete(&self, version: &str) -> CacheResult<bool> {
        self.backend.delete(version).await
    }

    /// Delete every store except `current`. Returns the deleted names.
    pub async fn prune_except(&self, current: &str) -> CacheResult<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.names().await? {
            if name == current {
                continue;
            }
            if self.backend.delete(&name).await? {
                tracing::info!(store = %name, "deleted stale snapshot store");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }
}

impl std::fmt::Debug for SnapshotStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStorage").finish_non_exhaustive()
    }
}

/// One named snapshot store.
#[derive(Clone)]
pub struct SnapshotStore {
    backend: Arc<dyn SnapshotBackend>,
    name: String,
}

impl SnapshotStore {
    /// Store name (the version identifier).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a stored response.
    pub async fn get(&self, key: &RequestKey) -> CacheResult<Option<Response>> {
        match self.backend.get(&self.name, key).await {
            Err(CacheError::StoreNotFound(_)) => Ok(None),
            other => other,
        }
    }

    /// Store a response.
    pub async fn put(&self, key: RequestKey, response: Response) -> CacheResult<()> {
        self.backend.put(&self.name, key, response).await
    }

    /// Store a batch atomically.
    pub async fn put_all(&self, entries: Vec<(RequestKey, Response)>) -> CacheResult<()> {
        self.backend.put_all(&self.name, entries).await
    }

    /// Stored keys.
    pub async fn keys(&self) -> CacheResult<Vec<RequestKey>> {
        self.backend.keys(&self.name).await
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// In-memory snapshot backend (for development/testing).
#[derive(Debug, Default)]
pub struct InMemorySnapshots {
    stores: RwLock<BTreeMap<String, BTreeMap<RequestKey, Response>>>,
}

impl InMemorySnapshots {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotBackend for InMemorySnapshots {
    async fn open(&self, name: &str) -> CacheResult<()> {
        self.stores
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn names(&self) -> CacheResult<Vec<String>> {
        Ok(self.stores.read().await.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> CacheResult<bool> {
        Ok(self.stores.write().await.remove(name).is_some())
    }

    async fn get(&self, name: &str, key: &RequestKey) -> CacheResult<Option<Response>> {
        let stores = self.stores.read().await;
        let store = stores
            .get(name)
            .ok_or_else(|| CacheError::StoreNotFound(name.to_string()))?;
        Ok(store.get(key).cloned())
    }

    async fn put(&self, name: &str, key: RequestKey, response: Response) -> CacheResult<()> {
        let mut stores = self.stores.write().await;
        let store = stores
            .get_mut(name)
            .ok_or_else(|| CacheError::StoreNotFound(name.to_string()))?;
        store.insert(key, response);
        Ok(())
    }

    async fn put_all(&self, name: &str, entries: Vec<(RequestKey, Response)>) -> CacheResult<()> {
        let mut stores = self.stores.write().await;
        let store = stores
            .get_mut(name)
            .ok_or_else(|| CacheError::StoreNotFound(name.to_string()))?;
        store.extend(entries);
        Ok(())
    }

    async fn keys(&self, name: &str) -> CacheResult<Vec<RequestKey>> {
        let stores = self.stores.read().await;
        let store = stores
            .get(name)
            .ok_or_else(|| CacheError::StoreNotFound(name.to_string()))?;
        Ok(store.keys().cloned().collect())
    }
}
