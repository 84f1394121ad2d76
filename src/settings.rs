/// User settings kept in chrome.storage.sync

use crate::config::{API_KEY_FIELD, SENDER_NAME_FIELD};
use crate::error::StoreError;
use crate::storage::KeyValueStore;

/// Each field lives under its own storage key so older installs that only
/// wrote `voilaNorbertKey` keep working.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub voila_norbert_key: String,
    pub sender_name: String,
}

impl Settings {
    pub async fn load<S: KeyValueStore>(store: &S) -> Result<Settings, StoreError> {
        Ok(Settings {
            voila_norbert_key: store.get(API_KEY_FIELD).await?.unwrap_or_default(),
            sender_name: store.get(SENDER_NAME_FIELD).await?.unwrap_or_default(),
        })
    }

    pub async fn save<S: KeyValueStore>(&self, store: &S) -> Result<(), StoreError> {
        store.set(API_KEY_FIELD, &self.voila_norbert_key).await?;
        store.set(SENDER_NAME_FIELD, &self.sender_name).await?;
        Ok(())
    }

    /// The configured API key, if any (blank counts as unset)
    pub fn api_key(&self) -> Option<&str> {
        let key = self.voila_norbert_key.trim();
        if key.is_empty() { None } else { Some(key) }
    }
}
