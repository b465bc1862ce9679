use chrono::{DateTime, Utc};

use crate::errors::CoreError;
use crate::models::settings::Settings;
use crate::models::state::WishlistState;
use crate::models::wishlist::{NewWishlist, WishlistPatch, WishlistRecord};

/// Result of a delete request that passed the one-record floor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// No record had the given id.
    NotFound,
    /// The record was removed. `promoted` holds the id that became current
    /// when the removed record was the current one.
    Removed {
        record: WishlistRecord,
        promoted: Option<String>,
    },
}

/// Business rules for the wishlist collection.
///
/// Pure logic over `WishlistState`. Storage and notifications live in the store.
pub struct WishlistService;

impl WishlistService {
    pub fn new() -> Self {
        Self
    }

    /// Initial state when nothing has been persisted yet.
    pub fn seed_state(&self, settings: &Settings, now: DateTime<Utc>) -> WishlistState {
        let seed = &settings.seed;
        let mut record = WishlistRecord {
            id: seed.id.clone(),
            image: seed.image.clone(),
            name: seed.name.clone(),
            price: seed.price,
            saved: seed.saved,
            date_created: now,
            completed: false,
            category: None,
            target_date: None,
        };
        record.refresh_completed();
        WishlistState::seeded(record)
    }

    /// Append a new record and make it current. Returns the new id.
    pub fn add(
        &self,
        state: &mut WishlistState,
        candidate: NewWishlist,
        now: DateTime<Utc>,
    ) -> Result<String, CoreError> {
        candidate.validate()?;
        let record = WishlistRecord::from_candidate(candidate, now);
        let id = record.id.clone();
        state.wishlists.push(record);
        state.current_wishlist_id = Some(id.clone());
        Ok(id)
    }

    /// Merge `patch` into the matching record. `Ok(false)` if the id is unknown.
    pub fn update(
        &self,
        state: &mut WishlistState,
        id: &str,
        patch: WishlistPatch,
    ) -> Result<bool, CoreError> {
        patch.validate()?;
        match state.get_mut(id) {
            Some(record) => {
                patch.apply_to(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a record, refusing to empty the collection.
    ///
    /// If the removed record was current, the first remaining record is promoted.
    pub fn delete(&self, state: &mut WishlistState, id: &str) -> Result<Removal, CoreError> {
        if state.wishlists.len() <= 1 {
            return Err(CoreError::LastWishlist);
        }

        let Some(idx) = state.wishlists.iter().position(|w| w.id == id) else {
            return Ok(Removal::NotFound);
        };
        let record = state.wishlists.remove(idx);

        let promoted = if state.is_current(id) {
            let next = state.wishlists.first().map(|w| w.id.clone());
            state.current_wishlist_id = next.clone();
            next
        } else {
            None
        };

        Ok(Removal::Removed { record, promoted })
    }

    /// Make `id` current. `false` when it already is, or when no record has that id.
    pub fn select(&self, state: &mut WishlistState, id: &str) -> bool {
        if state.is_current(id) || state.get(id).is_none() {
            return false;
        }
        state.current_wishlist_id = Some(id.to_string());
        true
    }

    /// Zero the saved amount. `false` if the id is unknown.
    pub fn reset_savings(&self, state: &mut WishlistState, id: &str) -> bool {
        match state.get_mut(id) {
            Some(record) => {
                record.saved = 0;
                record.refresh_completed();
                true
            }
            None => false,
        }
    }

    /// Add a deposit to the record's saved amount.
    ///
    /// Rules:
    /// - Amount must be positive (checked before the id lookup)
    /// - The running total must not overflow
    ///
    /// Returns the accepted amount, or `None` if the id is unknown.
    pub fn add_savings(
        &self,
        state: &mut WishlistState,
        id: &str,
        amount: i64,
    ) -> Result<Option<u64>, CoreError> {
        let accepted = Self::validate_amount(amount)?;

        let Some(record) = state.get_mut(id) else {
            return Ok(None);
        };

        record.saved = record.saved.checked_add(accepted).ok_or_else(|| {
            CoreError::ValidationError(format!(
                "Deposit of {accepted} would overflow the saved amount of '{}'",
                record.name
            ))
        })?;
        record.refresh_completed();
        Ok(Some(accepted))
    }

    /// Swap in a whole new collection (used by import).
    /// The first record becomes current.
    pub fn replace_all(
        &self,
        state: &mut WishlistState,
        mut records: Vec<WishlistRecord>,
    ) -> Result<(), CoreError> {
        if records.is_empty() {
            return Err(CoreError::ValidationError(
                "Imported collection must contain at least one wishlist".into(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for record in &mut records {
            if record.id.trim().is_empty() {
                return Err(CoreError::ValidationError("Wishlist id must not be empty".into()));
            }
            if !seen.insert(record.id.clone()) {
                return Err(CoreError::ValidationError(format!(
                    "Duplicate wishlist id '{}'",
                    record.id
                )));
            }
            NewWishlist::new(record.name.clone(), record.price, record.image.clone()).validate()?;
            record.refresh_completed();
        }

        state.current_wishlist_id = records.first().map(|w| w.id.clone());
        state.wishlists = records;
        Ok(())
    }

    fn validate_amount(amount: i64) -> Result<u64, CoreError> {
        if amount <= 0 {
            return Err(CoreError::InvalidAmount(amount));
        }
        u64::try_from(amount).map_err(|_| CoreError::InvalidAmount(amount))
    }
}

impl Default for WishlistService {
    fn default() -> Self {
        Self::new()
    }
}
