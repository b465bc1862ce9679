use std::collections::BTreeMap;

use crate::errors::CoreError;

use super::traits::KeyValueStorage;

/// In-process storage backed by an ordered map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read-only view of everything stored.
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl From<BTreeMap<String, String>> for MemoryStorage {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), CoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn contains_key(&self, key: &str) -> Result<bool, CoreError> {
        Ok(self.entries.contains_key(key))
    }
}
