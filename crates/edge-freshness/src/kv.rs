//! Synchronous key/value storage.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::StorageError;

/// Page-local string storage. Each call is atomic on its own; nothing
/// makes a read followed by a write atomic.
pub trait KeyValueStorage: Send + Sync {
    /// Read a value. Returns `None` if the key doesn't exist.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// All stored keys.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Arc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }
}

/// In-memory storage (for development/testing).
///
/// Supports a byte quota over keys plus values, and can be switched
/// unavailable to simulate storage that throws on every call.
#[derive(Debug)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
    available: AtomicBool,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            quota: None,
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryStorage {
    /// Create empty, unlimited storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit total stored bytes.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Make every call fail with [`StorageError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("storage disabled".to_string()))
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut items = self.lock();

        if let Some(quota) = self.quota {
            let used: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let bytes = key.len() + value.len();
            if used + bytes > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    bytes,
                });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.check_available()?;
        Ok(self.lock().keys().cloned().collect())
    }
}

/// Helper to build cache keys from parts.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("sleep", user_id, "weekly");
/// // Returns "sleep:user123:weekly"
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        storage.set_item("theme", "dark").unwrap();
        assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("dark"));

        storage.remove_item("theme").unwrap();
        storage.remove_item("theme").unwrap();
        assert!(storage.get_item("theme").unwrap().is_none());
    }

    #[test]
    fn test_quota_counts_replaced_value_once() {
        let storage = MemoryStorage::new().with_quota(12);
        storage.set_item("k", "0123456789").unwrap();
        storage.set_item("k", "9876543210").unwrap();

        let err = storage.set_item("k2", "x").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { bytes: 3, .. }));
    }

    #[test]
    fn test_unavailable_storage() {
        let storage = MemoryStorage::new();
        storage.set_available(false);
        assert!(matches!(
            storage.keys().unwrap_err(),
            StorageError::Unavailable(_)
        ));
    }

    #[test]
    fn test_cache_key_macro() {
        let user = 42;
        assert_eq!(cache_key!("sleep", user, "weekly"), "sleep:42:weekly");
    }
}
