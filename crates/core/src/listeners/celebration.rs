use crate::errors::CoreError;
use crate::models::notification::Notification;
use crate::storage::keys;

use super::{NotificationContext, WishlistListener};

/// Fires the completion celebration once per wishlist.
///
/// The first deposit that completes a wishlist sets `celebration-<wishlistId>`
/// and raises a pending signal; later deposits find the flag and stay quiet.
/// Resetting the savings clears the flag (the store purges it), so reaching
/// the target again celebrates again.
#[derive(Debug, Clone, Default)]
pub struct CelebrationTracker {
    pending: Option<String>,
}

impl CelebrationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the wishlist waiting to be celebrated, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Consume the pending celebration.
    pub fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }
}

impl WishlistListener for CelebrationTracker {
    fn on_notification(
        &mut self,
        notification: &Notification,
        ctx: &mut NotificationContext<'_>,
    ) -> Result<(), CoreError> {
        match notification {
            Notification::Deposit { .. } => {
                let Some(subject) = ctx.subject.filter(|w| w.completed) else {
                    return Ok(());
                };
                let key = keys::celebration(&subject.id);
                if ctx.storage.contains_key(&key)? {
                    return Ok(());
                }
                ctx.storage.set_item(&key, "true")?;
                log::info!("Target reached for '{}'", subject.name);
                self.pending = Some(subject.id.clone());
                Ok(())
            }
            Notification::Reset | Notification::SelectionChanged => {
                self.pending = None;
                Ok(())
            }
        }
    }
}
