//! Time-to-live cache for fetched payloads.

use std::time::Duration;

use edge_core::{Clock, SystemClock};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::kv::KeyValueStorage;
use crate::StorageError;

/// Prefix of every key this cache writes.
pub const NAMESPACE_PREFIX: &str = "api_cache_";

/// Entries older than this are stale.
pub const TTL: Duration = Duration::from_secs(5 * 60);

/// Stored record: `{ "data": <json>, "timestamp": <epoch ms> }`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredEntry<T> {
    data: T,
    timestamp: i64,
}

impl<T: DeserializeOwned> StoredEntry<T> {
    /// Parse a stored record. Both fields are required, even when `T`
    /// would accept a missing value.
    fn decode(raw: &str) -> Result<Self, StorageError> {
        let value: Value = serde_json::from_str(raw)?;
        match value.as_object() {
            Some(record) if record.contains_key("data") => Ok(serde_json::from_value(value)?),
            Some(_) => Err(StorageError::Malformed("missing `data`".to_string())),
            None => Err(StorageError::Malformed("not an object".to_string())),
        }
    }
}

/// Outcome of reading one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Entry present and well-formed.
    Hit { data: T, timestamp: i64 },
    /// Nothing stored under the key.
    Miss,
    /// Stored value could not be read or parsed.
    Corrupt(String),
}

impl<T> Lookup<T> {
    /// Collapse to present/absent.
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Hit { data, .. } => Some(data),
            Self::Miss | Self::Corrupt(_) => None,
        }
    }
}

/// Target of [`FreshnessCache::invalidate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidate<'a> {
    /// One application key.
    Key(&'a str),
    /// Every key under the namespace prefix.
    All,
}

/// Namespaced TTL cache over synchronous key/value storage.
///
/// Staleness is advisory: [`get`](Self::get) returns stale data, and callers
/// ask [`is_fresh`](Self::is_fresh) to decide whether to refetch. No
/// operation returns an error; storage and parse failures read as a miss and
/// writes that fail are dropped.
#[derive(Debug)]
pub struct FreshnessCache<S, C = SystemClock> {
    storage: S,
    clock: C,
}

impl<S: KeyValueStorage> FreshnessCache<S> {
    /// Cache over `storage`, timed by the system clock.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            clock: SystemClock,
        }
    }
}

impl<S: KeyValueStorage, C: Clock> FreshnessCache<S, C> {
    /// Replace the clock.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> FreshnessCache<S, C2> {
        FreshnessCache {
            storage: self.storage,
            clock,
        }
    }

    /// Underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Storage key for an application key.
    pub fn storage_key(key: &str) -> String {
        format!("{}{}", NAMESPACE_PREFIX, key)
    }

    /// Read an entry, distinguishing missing from unreadable.
    pub fn lookup<T: DeserializeOwned>(&self, key: &str) -> Lookup<T> {
        let raw = match self.storage.get_item(&Self::storage_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Lookup::Miss,
            Err(e) => {
                tracing::warn!(key, error = %e, "freshness cache read failed");
                return Lookup::Corrupt(e.to_string());
            }
        };

        match StoredEntry::<T>::decode(&raw) {
            Ok(entry) => Lookup::Hit {
                data: entry.data,
                timestamp: entry.timestamp,
            },
            Err(e) => {
                tracing::debug!(key, error = %e, "corrupt freshness cache entry");
                Lookup::Corrupt(e.to_string())
            }
        }
    }

    /// Stored payload, fresh or stale.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.lookup(key).into_data()
    }

    /// Whether an entry exists and was written less than [`TTL`] ago.
    pub fn is_fresh(&self, key: &str) -> bool {
        match self.lookup::<Value>(key) {
            Lookup::Hit { timestamp, .. } => {
                let age = self.clock.now_millis().saturating_sub(timestamp);
                age < TTL.as_millis() as i64
            }
            Lookup::Miss | Lookup::Corrupt(_) => false,
        }
    }

    /// Store `data` stamped with the current time, replacing any previous entry.
    pub fn set<T: Serialize>(&self, key: &str, data: &T) {
        let entry = StoredEntry {
            data,
            timestamp: self.clock.now_millis(),
        };
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "freshness cache payload not serializable");
                return;
            }
        };
        if let Err(e) = self.storage.set_item(&Self::storage_key(key), &raw) {
            tracing::warn!(key, error = %e, "freshness cache write dropped");
        }
    }

    /// Remove one entry.
    pub fn clear(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(&Self::storage_key(key)) {
            tracing::warn!(key, error = %e, "freshness cache clear failed");
        }
    }

    /// Remove every namespaced entry. Other keys are left alone.
    pub fn clear_all(&self) {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "freshness cache clear-all failed");
                return;
            }
        };
        for key in keys.iter().filter(|k| k.starts_with(NAMESPACE_PREFIX)) {
            if let Err(e) = self.storage.remove_item(key) {
                tracing::warn!(key = key.as_str(), error = %e, "freshness cache clear failed");
            }
        }
    }

    /// Drop one entry or the whole namespace.
    pub fn invalidate(&self, target: Invalidate<'_>) {
        match target {
            Invalidate::Key(key) => self.clear(key),
            Invalidate::All => self.clear_all(),
        }
    }
}
