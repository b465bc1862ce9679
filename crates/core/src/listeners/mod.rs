pub mod calendar;
pub mod celebration;
pub mod checklist;
pub mod daily;

use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::CoreError;
use crate::models::notification::Notification;
use crate::models::settings::Settings;
use crate::models::wishlist::WishlistRecord;
use crate::storage::traits::KeyValueStorage;

/// What a listener may see and touch while handling a notification.
///
/// Storage is lent for the duration of the call so listeners can maintain
/// their own wishlist-scoped keys; the records themselves are read-only.
pub struct NotificationContext<'a> {
    pub storage: &'a mut dyn KeyValueStorage,
    /// Record that is current after the change
    pub current: Option<&'a WishlistRecord>,
    /// Record the notification is about (the deposited or reset one,
    /// or the newly selected one). `None` once a record was deleted.
    pub subject: Option<&'a WishlistRecord>,
    pub settings: &'a Settings,
    pub now: DateTime<Utc>,
    /// Local calendar day
    pub today: NaiveDate,
}

impl NotificationContext<'_> {
    #[must_use]
    pub fn current_id(&self) -> Option<&str> {
        self.current.map(|w| w.id.as_str())
    }
}

/// Observer of store notifications (calendar, checklist, progress card...).
pub trait WishlistListener {
    /// React to one notification. Errors are logged by the store and do not
    /// undo the mutation that triggered them.
    fn on_notification(
        &mut self,
        notification: &Notification,
        ctx: &mut NotificationContext<'_>,
    ) -> Result<(), CoreError>;

    /// Called once on subscribe so the listener can load state for the
    /// current wishlist.
    fn attach(&mut self, ctx: &mut NotificationContext<'_>) -> Result<(), CoreError> {
        let _ = ctx;
        Ok(())
    }
}

/// Handle returned by `WishlistStore::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
