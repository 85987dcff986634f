//! String-keyed persistent storage.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::Mutex;

/// Key under which the OCR API credential is stored.
pub const API_KEY_KEY: &str = "mistralOcrApiKey";
/// Key under which the JSON-encoded history array is stored.
pub const HISTORY_KEY: &str = "mistralOcrHistory";

/// Minimal get/set/remove store the history cache and credential settings
/// are persisted through.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.lock()?.remove(key);
        Ok(())
    }
}
