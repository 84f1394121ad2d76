/// Key-value storage over chrome.storage.local / chrome.storage.sync

use crate::chrome;
use crate::error::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Asynchronous key-value store holding JSON-shaped values
pub trait KeyValueStore {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>;

    async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError>;

    /// Remove every key in the store
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Which chrome.storage area a `ChromeStore` talks to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StorageArea {
    /// Per-device; holds the lookup cache
    Local,
    /// Synced with the user's profile; holds settings
    Sync,
}

impl StorageArea {
    fn as_str(self) -> &'static str {
        match self {
            StorageArea::Local => "local",
            StorageArea::Sync => "sync",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChromeStore {
    area: StorageArea,
}

impl ChromeStore {
    pub fn local() -> Self {
        ChromeStore { area: StorageArea::Local }
    }

    pub fn sync() -> Self {
        ChromeStore { area: StorageArea::Sync }
    }
}

impl KeyValueStore for ChromeStore {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let value = chrome::get_storage(self.area.as_str(), key).await?;

        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }

        serde_wasm_bindgen::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::Serialization {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        // json_compatible keeps `None` as null and maps as plain objects
        let value = value
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| StoreError::Serialization {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        chrome::set_storage(self.area.as_str(), key, value).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        chrome::clear_storage(self.area.as_str()).await?;
        Ok(())
    }
}

/// In-memory store standing in for chrome.storage in unit tests
#[cfg(test)]
pub mod memory {
    use super::KeyValueStore;
    use crate::error::StoreError;
    use serde::Serialize;
    use serde::de::DeserializeOwned;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    pub struct MemoryStore {
        entries: RefCell<HashMap<String, serde_json::Value>>,
        writes: Cell<usize>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn writes(&self) -> usize {
            self.writes.get()
        }

        pub fn len(&self) -> usize {
            self.entries.borrow().len()
        }

        pub fn raw(&self, key: &str) -> Option<serde_json::Value> {
            self.entries.borrow().get(key).cloned()
        }
    }

    impl KeyValueStore for MemoryStore {
        async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
            self.entries
                .borrow()
                .get(key)
                .map(|value| {
                    serde_json::from_value(value.clone()).map_err(|e| StoreError::Serialization {
                        key: key.to_string(),
                        reason: e.to_string(),
                    })
                })
                .transpose()
        }

        async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
            let value = serde_json::to_value(value).map_err(|e| StoreError::Serialization {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
            self.entries.borrow_mut().insert(key.to_string(), value);
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }

        async fn clear(&self) -> Result<(), StoreError> {
            self.entries.borrow_mut().clear();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_storage_area_names() {
        assert_eq!(StorageArea::Local.as_str(), "local");
        assert_eq!(StorageArea::Sync.as_str(), "sync");
    }

    #[test]
    fn test_memory_store_get_missing() {
        let store = MemoryStore::new();

        let value: Option<String> = block_on(store.get("nothing")).unwrap();

        assert!(value.is_none());
    }

    #[test]
    fn test_memory_store_set_and_get() {
        let store = MemoryStore::new();

        block_on(store.set("voilaNorbertKey", &"secret".to_string())).unwrap();
        let value: Option<String> = block_on(store.get("voilaNorbertKey")).unwrap();

        assert_eq!(value.as_deref(), Some("secret"));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_memory_store_clear() {
        let store = MemoryStore::new();
        block_on(store.set("a", &1)).unwrap();
        block_on(store.set("b", &2)).unwrap();

        block_on(store.clear()).unwrap();

        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_memory_store_type_mismatch() {
        let store = MemoryStore::new();
        block_on(store.set("a", &"text")).unwrap();

        let result: Result<Option<u32>, _> = block_on(store.get("a"));

        assert!(matches!(result, Err(StoreError::Serialization { .. })));
    }
}
