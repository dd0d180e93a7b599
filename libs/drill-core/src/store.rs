//! Persistence adapter interface and the namespaced storage wrapper.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Default namespace prefix for every persisted key.
pub const DEFAULT_PREFIX: &str = "krEnQuiz:v1";

pub const KEY_OVERRIDES: &str = "overrides";
pub const KEY_STATE: &str = "state";
pub const KEY_XP: &str = "xp";
pub const KEY_HEARTS: &str = "hearts";
pub const KEY_STREAK: &str = "streak";

type Result<T> = std::result::Result<T, StoreError>;

/// String key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry.
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Namespaced access to a store.
///
/// Failures are logged and swallowed: reads yield `None`, writes are dropped.
/// The engine keeps running from memory when storage is unavailable.
#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn KeyValueStore>,
    prefix: Arc<str>,
}

impl Storage {
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Storage under the default prefix.
    pub fn with_default_prefix(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, DEFAULT_PREFIX)
    }

    /// In-memory storage, handy for tests and for running without a database.
    pub fn in_memory() -> Self {
        Self::with_default_prefix(Arc::new(MemoryStore::new()))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    pub fn read(&self, key: &str) -> Option<String> {
        match self.store.get(&self.full_key(key)) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed");
                None
            }
        }
    }

    pub fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(&self.full_key(key), value) {
            tracing::warn!(key, error = %e, "storage write failed; keeping value in memory only");
        }
    }

    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable stored value");
                None
            }
        }
    }

    pub fn write_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.write(key, &raw),
            Err(e) => tracing::warn!(key, error = %e, "failed to encode value for storage"),
        }
    }

    pub fn read_u32(&self, key: &str) -> Option<u32> {
        self.read(key)?.trim().parse().ok()
    }

    pub fn write_u32(&self, key: &str, value: u32) {
        self.write(key, &value.to_string());
    }

    /// Remove every key under the namespace.
    pub fn clear(&self) {
        let prefix = format!("{}:", self.prefix);
        let keys = match self.store.keys_with_prefix(&prefix) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list stored keys");
                return;
            }
        };
        for key in keys {
            if let Err(e) = self.store.remove(&key) {
                tracing::warn!(key, error = %e, "failed to remove stored key");
            }
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").field("prefix", &self.prefix).finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Store whose every operation fails, like disabled browser storage.
    pub(crate) struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(StoreError::Unavailable("disabled".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(StoreError::Unavailable("quota exceeded".into()))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(StoreError::Unavailable("disabled".into()))
        }
        fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
            Err(StoreError::Unavailable("disabled".into()))
        }
    }

    #[test]
    fn keys_are_namespaced() {
        let store = MemoryStore::new();
        let storage = Storage::with_default_prefix(Arc::new(store.clone()));
        storage.write_u32(KEY_XP, 30);
        assert_eq!(store.entries().get("krEnQuiz:v1:xp").map(String::as_str), Some("30"));
        assert_eq!(storage.read_u32(KEY_XP), Some(30));
    }

    #[test]
    fn clear_only_touches_namespace() {
        let store = MemoryStore::new();
        store.set("other:app", "keep").unwrap();
        let storage = Storage::with_default_prefix(Arc::new(store.clone()));
        storage.write(KEY_STATE, "{}");
        storage.write_u32(KEY_HEARTS, 2);
        storage.clear();
        let entries = store.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("other:app"));
    }

    #[test]
    fn json_round_trip_and_garbage() {
        let storage = Storage::in_memory();
        storage.write_json(KEY_OVERRIDES, &vec![1, 2, 3]);
        assert_eq!(storage.read_json::<Vec<u32>>(KEY_OVERRIDES), Some(vec![1, 2, 3]));
        storage.write(KEY_STATE, "{not json");
        assert_eq!(storage.read_json::<Vec<u32>>(KEY_STATE), None);
    }

    #[test]
    fn failing_store_is_swallowed() {
        let storage = Storage::with_default_prefix(Arc::new(FailingStore));
        storage.write_u32(KEY_XP, 10);
        assert_eq!(storage.read_u32(KEY_XP), None);
        storage.clear();
    }
}
