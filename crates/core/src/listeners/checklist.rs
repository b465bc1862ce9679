use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::notification::Notification;
use crate::models::savings_log::SavingsLogEntry;
use crate::storage::keys;
use crate::storage::manager::StorageManager;
use crate::storage::traits::KeyValueStorage;

use super::{NotificationContext, WishlistListener};

/// Savings history of the current wishlist, newest first, persisted under
/// `checklist-<wishlistId>`.
///
/// Every accepted deposit is logged automatically; entries can also be added
/// by hand and ticked on or off. None of this touches the saved total.
#[derive(Debug, Clone, Default)]
pub struct SavingsChecklist {
    wishlist_id: Option<String>,
    entries: Vec<SavingsLogEntry>,
}

impl SavingsChecklist {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn wishlist_id(&self) -> Option<&str> {
        self.wishlist_id.as_deref()
    }

    /// Entries, newest first.
    #[must_use]
    pub fn entries(&self) -> &[SavingsLogEntry] {
        &self.entries
    }

    /// Sum of the ticked entries.
    #[must_use]
    pub fn completed_total(&self) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.completed)
            .map(|e| e.amount)
            .sum()
    }

    /// Log a manual entry against the loaded wishlist.
    ///
    /// The amount must be positive; a blank note falls back to the configured
    /// default note.
    pub fn add_entry(
        &mut self,
        ctx: &mut NotificationContext<'_>,
        amount: i64,
        note: &str,
    ) -> Result<&SavingsLogEntry, CoreError> {
        if amount <= 0 {
            return Err(CoreError::InvalidAmount(amount));
        }
        let Some(id) = self.wishlist_id.clone() else {
            return Err(CoreError::ValidationError(
                "No wishlist selected for the checklist".into(),
            ));
        };

        let note = Self::note_or_default(note, &ctx.settings.default_checklist_note);
        self.entries
            .insert(0, SavingsLogEntry::new(ctx.now, amount.unsigned_abs(), note));
        StorageManager::write_json(&mut *ctx.storage, &keys::checklist(&id), &self.entries)?;
        log::info!("Checklist entry of {amount} logged for {id}");
        Ok(&self.entries[0])
    }

    /// Flip the completed tick of an entry. `Ok(false)` if no such entry.
    pub fn toggle_completed(
        &mut self,
        ctx: &mut NotificationContext<'_>,
        entry_id: Uuid,
    ) -> Result<bool, CoreError> {
        let Some(id) = self.wishlist_id.clone() else {
            return Ok(false);
        };
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == entry_id) else {
            return Ok(false);
        };
        entry.completed = !entry.completed;
        StorageManager::write_json(&mut *ctx.storage, &keys::checklist(&id), &self.entries)?;
        Ok(true)
    }

    fn note_or_default(note: &str, default: &str) -> String {
        let trimmed = note.trim();
        if trimmed.is_empty() {
            default.to_string()
        } else {
            trimmed.to_string()
        }
    }

    fn load(
        storage: &dyn KeyValueStorage,
        wishlist_id: &str,
    ) -> Result<Vec<SavingsLogEntry>, CoreError> {
        Ok(
            StorageManager::read_json::<Vec<SavingsLogEntry>, _>(storage, &keys::checklist(wishlist_id))?
                .unwrap_or_default(),
        )
    }

    fn reload(&mut self, ctx: &NotificationContext<'_>) -> Result<(), CoreError> {
        self.entries.clear();
        self.wishlist_id = ctx.current_id().map(str::to_string);
        if let Some(id) = &self.wishlist_id {
            self.entries = Self::load(&*ctx.storage, id)?;
        }
        Ok(())
    }

    fn deposit_entry(ctx: &NotificationContext<'_>, amount: u64) -> SavingsLogEntry {
        SavingsLogEntry::new(ctx.now, amount, ctx.settings.default_checklist_note.clone())
    }
}

impl WishlistListener for SavingsChecklist {
    fn on_notification(
        &mut self,
        notification: &Notification,
        ctx: &mut NotificationContext<'_>,
    ) -> Result<(), CoreError> {
        match notification {
            Notification::Deposit { amount, .. } => {
                let Some(subject) = ctx.subject else {
                    return Ok(());
                };
                let key = keys::checklist(&subject.id);
                let entry = Self::deposit_entry(ctx, *amount);

                if self.wishlist_id.as_deref() == Some(subject.id.as_str()) {
                    self.entries.insert(0, entry);
                    StorageManager::write_json(&mut *ctx.storage, &key, &self.entries)
                } else {
                    let mut entries = Self::load(&*ctx.storage, &subject.id)?;
                    entries.insert(0, entry);
                    StorageManager::write_json(&mut *ctx.storage, &key, &entries)
                }
            }
            Notification::Reset | Notification::SelectionChanged => self.reload(ctx),
        }
    }

    fn attach(&mut self, ctx: &mut NotificationContext<'_>) -> Result<(), CoreError> {
        self.reload(ctx)
    }
}
