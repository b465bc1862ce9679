use crate::errors::CoreError;

/// Synchronous string key-value storage, the shape of browser local storage.
///
/// The store and its listeners only ever talk to persistence through this
/// trait, so the backend (in-memory map, file on disk, a wasm binding to
/// `window.localStorage`) can be swapped without touching any logic.
pub trait KeyValueStorage {
    /// Value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Insert or overwrite `key`.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<(), CoreError>;

    /// All keys currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>, CoreError>;

    fn contains_key(&self, key: &str) -> Result<bool, CoreError> {
        Ok(self.get_item(key)?.is_some())
    }
}
