use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CoreError;
use crate::models::state::WishlistState;
use crate::models::wishlist::WishlistRecord;

use super::keys;
use super::traits::KeyValueStorage;

/// High-level storage operations: load/save the store state and the
/// JSON-valued keys of the display components.
pub struct StorageManager;

impl StorageManager {
    /// Read the persisted state.
    ///
    /// Returns `None` when there is nothing to restore (no `wishlists` key,
    /// or an empty array), so the caller can seed a default record.
    /// Without a stored selection the first record becomes current.
    /// The stored `completed` flag is not trusted and is recomputed; a
    /// repeated id keeps only its first record.
    pub fn load_state<S: KeyValueStorage + ?Sized>(
        storage: &S,
    ) -> Result<Option<WishlistState>, CoreError> {
        let Some(stored) = Self::read_json::<Vec<WishlistRecord>, S>(storage, keys::WISHLISTS)?
        else {
            return Ok(None);
        };

        let mut seen = HashSet::new();
        let mut wishlists = Vec::with_capacity(stored.len());
        for mut record in stored {
            if !seen.insert(record.id.clone()) {
                log::warn!("Dropped stored wishlist with duplicate id '{}'", record.id);
                continue;
            }
            record.refresh_completed();
            wishlists.push(record);
        }
        if wishlists.is_empty() {
            return Ok(None);
        }

        let current_wishlist_id = storage
            .get_item(keys::CURRENT_WISHLIST_ID)?
            .filter(|id| !id.is_empty())
            .or_else(|| wishlists.first().map(|w| w.id.clone()));

        Ok(Some(WishlistState {
            wishlists,
            current_wishlist_id,
        }))
    }

    /// Persist the record collection and the current selection.
    ///
    /// Flow: records → JSON array under `wishlists`; current id → raw string
    /// under `currentWishlistId` (removed when nothing is selected).
    pub fn save_state<S: KeyValueStorage + ?Sized>(
        storage: &mut S,
        state: &WishlistState,
    ) -> Result<(), CoreError> {
        Self::write_json(storage, keys::WISHLISTS, &state.wishlists)?;
        match &state.current_wishlist_id {
            Some(id) => storage.set_item(keys::CURRENT_WISHLIST_ID, id)?,
            None => storage.remove_item(keys::CURRENT_WISHLIST_ID)?,
        }
        Ok(())
    }

    /// Remove every display-side key scoped to `wishlist_id`.
    /// Returns the number of keys removed.
    pub fn purge_wishlist<S: KeyValueStorage + ?Sized>(
        storage: &mut S,
        wishlist_id: &str,
    ) -> Result<usize, CoreError> {
        let all = storage.keys()?;
        let scoped: Vec<String> = keys::scoped_to(&all, wishlist_id)
            .into_iter()
            .map(str::to_string)
            .collect();
        for key in &scoped {
            storage.remove_item(key)?;
        }
        Ok(scoped.len())
    }

    /// Deserialize the JSON value stored under `key`, if present.
    pub fn read_json<T: DeserializeOwned, S: KeyValueStorage + ?Sized>(
        storage: &S,
        key: &str,
    ) -> Result<Option<T>, CoreError> {
        match storage.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| CoreError::Deserialization(format!("Failed to parse '{key}': {e}"))),
            None => Ok(None),
        }
    }

    /// Serialize `value` as JSON under `key`.
    pub fn write_json<T: Serialize + ?Sized, S: KeyValueStorage + ?Sized>(
        storage: &mut S,
        key: &str,
        value: &T,
    ) -> Result<(), CoreError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize '{key}': {e}")))?;
        storage.set_item(key, &raw)
    }
}
