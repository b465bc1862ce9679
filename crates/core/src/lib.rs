pub mod errors;
pub mod listeners;
pub mod models;
pub mod services;
pub mod storage;

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use listeners::{NotificationContext, SubscriptionId, WishlistListener};
use models::{
    notification::Notification,
    settings::Settings,
    state::WishlistState,
    wishlist::{NewWishlist, WishlistPatch, WishlistRecord},
};
use services::{
    clock::{Clock, SystemClock},
    wishlist_service::{Removal, WishlistService},
};
use storage::{manager::StorageManager, traits::KeyValueStorage};

use errors::CoreError;

/// Listener handle as held by the store.
pub type SharedListener = Rc<RefCell<dyn WishlistListener>>;

/// Main entry point for the wishlist core library.
///
/// Single owner and single writer of the wishlist collection and the current
/// selection. Every mutation is validated, persisted to `storage`
/// synchronously, and then broadcast to the subscribed listeners.
#[must_use]
pub struct WishlistStore<S: KeyValueStorage> {
    state: WishlistState,
    storage: S,
    settings: Settings,
    clock: Box<dyn Clock>,
    wishlist_service: WishlistService,
    listeners: Vec<(SubscriptionId, SharedListener)>,
    next_subscription: u64,
}

impl<S: KeyValueStorage> std::fmt::Debug for WishlistStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore")
            .field("wishlists", &self.state.wishlists.len())
            .field("current_wishlist_id", &self.state.current_wishlist_id)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S: KeyValueStorage> WishlistStore<S> {
    /// Open the store over `storage` with default settings and the system clock.
    pub fn open(storage: S) -> Result<Self, CoreError> {
        Self::open_with(storage, Settings::default(), SystemClock)
    }

    /// Open the store, restoring persisted state or seeding the default record.
    pub fn open_with(
        mut storage: S,
        settings: Settings,
        clock: impl Clock + 'static,
    ) -> Result<Self, CoreError> {
        let wishlist_service = WishlistService::new();

        let state = match StorageManager::load_state(&storage)? {
            Some(state) => {
                log::debug!("Restored {} wishlists", state.wishlists.len());
                state
            }
            None => {
                let state = wishlist_service.seed_state(&settings, clock.now_utc());
                StorageManager::save_state(&mut storage, &state)?;
                log::info!("No saved wishlists found, seeded '{}'", settings.seed.name);
                state
            }
        };

        Ok(Self {
            state,
            storage,
            settings,
            clock: Box::new(clock),
            wishlist_service,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    // ── Wishlist Management ─────────────────────────────────────────

    /// Create a wishlist from a form candidate and make it current.
    /// Returns the new id.
    pub fn add(&mut self, candidate: NewWishlist) -> Result<String, CoreError> {
        let snapshot = self.state.clone();
        let id = self
            .wishlist_service
            .add(&mut self.state, candidate, self.clock.now_utc())
            .inspect_err(|e| log::warn!("Wishlist not added: {e}"))?;
        self.commit(snapshot)?;

        if let Some(record) = self.state.get(&id) {
            log::info!("Wishlist '{}' added", record.name);
        }
        self.emit(Notification::Reset, Some(id.as_str()));
        self.emit(Notification::SelectionChanged, Some(id.as_str()));
        Ok(id)
    }

    /// Merge the patch into the record. `Ok(false)` if the id is unknown.
    pub fn update(&mut self, id: &str, patch: WishlistPatch) -> Result<bool, CoreError> {
        let snapshot = self.state.clone();
        let updated = self.wishlist_service.update(&mut self.state, id, patch)?;
        if !updated {
            log::debug!("Update ignored: no wishlist with id {id}");
            return Ok(false);
        }
        self.commit(snapshot)?;
        Ok(true)
    }

    /// Delete a record. Refused with `CoreError::LastWishlist` when it is the
    /// only one left. Deleting the current record promotes the first remaining
    /// one and fires reset + selection-changed.
    pub fn delete(&mut self, id: &str) -> Result<bool, CoreError> {
        let snapshot = self.state.clone();
        let removal = self
            .wishlist_service
            .delete(&mut self.state, id)
            .inspect_err(|e| log::warn!("Wishlist not deleted: {e}"))?;

        let Removal::Removed { record, promoted } = removal else {
            log::debug!("Delete ignored: no wishlist with id {id}");
            return Ok(false);
        };
        self.commit(snapshot)?;

        if let Err(e) = StorageManager::purge_wishlist(&mut self.storage, &record.id) {
            log::warn!("Could not remove saved logs of '{}': {e}", record.name);
        }
        log::info!("Wishlist '{}' deleted", record.name);

        if let Some(new_current) = promoted {
            self.emit(Notification::Reset, None);
            self.emit(Notification::SelectionChanged, Some(new_current.as_str()));
        }
        Ok(true)
    }

    /// Make `id` current. No-op (and no notifications) if it already is or
    /// if no record has that id.
    pub fn select(&mut self, id: &str) -> Result<bool, CoreError> {
        let snapshot = self.state.clone();
        if !self.wishlist_service.select(&mut self.state, id) {
            return Ok(false);
        }
        self.commit(snapshot)?;

        if let Some(record) = self.state.get(id) {
            log::info!("Now saving for '{}'", record.name);
        }
        self.emit(Notification::Reset, Some(id));
        self.emit(Notification::SelectionChanged, Some(id));
        Ok(true)
    }

    /// Set the saved amount back to zero and drop the record's day logs.
    pub fn reset_savings(&mut self, id: &str) -> Result<bool, CoreError> {
        let snapshot = self.state.clone();
        if !self.wishlist_service.reset_savings(&mut self.state, id) {
            log::debug!("Reset ignored: no wishlist with id {id}");
            return Ok(false);
        }
        self.commit(snapshot)?;

        if let Err(e) = StorageManager::purge_wishlist(&mut self.storage, id) {
            log::warn!("Could not clear saved logs of {id}: {e}");
        }
        log::info!("Savings of {id} reset to 0");
        self.emit(Notification::Reset, Some(id));
        Ok(true)
    }

    /// Deposit `amount` (must be > 0) into the record and recompute `completed`.
    ///
    /// Fires a deposit notification stamped with today's local date.
    pub fn add_savings(&mut self, id: &str, amount: i64) -> Result<bool, CoreError> {
        let snapshot = self.state.clone();
        let accepted = self
            .wishlist_service
            .add_savings(&mut self.state, id, amount)
            .inspect_err(|e| log::warn!("Deposit rejected: {e}"))?;

        let Some(accepted) = accepted else {
            log::debug!("Deposit ignored: no wishlist with id {id}");
            return Ok(false);
        };
        self.commit(snapshot)?;

        log::info!("{accepted} added to the savings of {id}");
        let today = self.clock.today();
        self.emit(Notification::deposit(today, accepted), Some(id));
        Ok(true)
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// The record matching the current id, or `None`.
    #[must_use]
    pub fn get_current(&self) -> Option<&WishlistRecord> {
        self.state.current()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WishlistRecord> {
        self.state.get(id)
    }

    #[must_use]
    pub fn current_wishlist_id(&self) -> Option<&str> {
        self.state.current_wishlist_id.as_deref()
    }

    /// All records, in insertion order.
    #[must_use]
    pub fn wishlists(&self) -> &[WishlistRecord] {
        &self.state.wishlists
    }

    #[must_use]
    pub fn wishlist_count(&self) -> usize {
        self.state.wishlists.len()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give the storage back, dropping the store.
    pub fn into_storage(self) -> S {
        self.storage
    }

    // ── Listeners ───────────────────────────────────────────────────

    /// Register a listener and attach it to the current wishlist.
    pub fn subscribe(&mut self, listener: SharedListener) -> Result<SubscriptionId, CoreError> {
        {
            let mut ctx = self.context();
            listener.borrow_mut().attach(&mut ctx)?;
        }
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        Ok(id)
    }

    /// Detach a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Context for driving a listener outside of a notification,
    /// e.g. adding a manual checklist entry.
    pub fn context(&mut self) -> NotificationContext<'_> {
        let current = self.state.current();
        NotificationContext {
            storage: &mut self.storage,
            current,
            subject: current,
            settings: &self.settings,
            now: self.clock.now_utc(),
            today: self.clock.today(),
        }
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all records as a pretty JSON array.
    pub fn export_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.state.wishlists)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize wishlists to JSON: {e}")))
    }

    /// Replace the whole collection with records from a JSON array.
    /// The first imported record becomes current. Returns the number imported.
    ///
    /// Day logs of every replaced record and of every imported id are
    /// dropped, since the imported `saved` amounts supersede them.
    pub fn import_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let records: Vec<WishlistRecord> = serde_json::from_str(json)?;
        let count = records.len();

        let snapshot = self.state.clone();
        self.wishlist_service
            .replace_all(&mut self.state, records)
            .inspect_err(|e| log::warn!("Import rejected: {e}"))?;

        let stale: BTreeSet<String> = snapshot
            .wishlists
            .iter()
            .chain(&self.state.wishlists)
            .map(|w| w.id.clone())
            .collect();
        self.commit(snapshot)?;

        for id in &stale {
            if let Err(e) = StorageManager::purge_wishlist(&mut self.storage, id) {
                log::warn!("Could not clear saved logs of {id}: {e}");
            }
        }

        log::info!("Imported {count} wishlists");
        let current = self.state.current_wishlist_id.clone();
        self.emit(Notification::Reset, current.as_deref());
        self.emit(Notification::SelectionChanged, current.as_deref());
        Ok(count)
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Persist the state; on failure roll back to `snapshot`, in memory and
    /// in storage, so the operation is rejected as a whole.
    fn commit(&mut self, snapshot: WishlistState) -> Result<(), CoreError> {
        if let Err(e) = StorageManager::save_state(&mut self.storage, &self.state) {
            log::warn!("Could not persist wishlists: {e}");
            if let Err(restore) = StorageManager::save_state(&mut self.storage, &snapshot) {
                log::warn!("Could not restore persisted wishlists: {restore}");
            }
            self.state = snapshot;
            return Err(e);
        }
        Ok(())
    }

    /// Deliver a notification to every listener. Listener failures are
    /// logged and never reach the caller.
    fn emit(&mut self, notification: Notification, subject_id: Option<&str>) {
        let Self {
            state,
            storage,
            settings,
            clock,
            listeners,
            ..
        } = self;

        let mut ctx = NotificationContext {
            storage,
            current: state.current(),
            subject: subject_id.and_then(|id| state.get(id)),
            settings,
            now: clock.now_utc(),
            today: clock.today(),
        };

        for (id, listener) in listeners.iter() {
            let Ok(mut listener) = listener.try_borrow_mut() else {
                log::warn!("Listener {id:?} is busy, skipped {notification}");
                continue;
            };
            if let Err(e) = listener.on_notification(&notification, &mut ctx) {
                log::warn!("Listener {id:?} failed on {notification}: {e}");
            }
        }
    }
}
