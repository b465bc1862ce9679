use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::notification::Notification;
use crate::storage::keys;

use super::{NotificationContext, WishlistListener};

/// "Already saved today" gate for the current wishlist.
///
/// Backed by `dailySaving-<wishlistId>-<day>-<month>-<year>` presence flags.
#[derive(Debug, Clone, Default)]
pub struct DailySavingGate {
    wishlist_id: Option<String>,
    checked_on: Option<NaiveDate>,
    saved_today: bool,
}

impl DailySavingGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag as derived on `checked_on`. Call `refresh_if_stale` first when
    /// the day may have rolled over since the last notification.
    #[must_use]
    pub fn saved_today(&self) -> bool {
        self.saved_today
    }

    #[must_use]
    pub fn can_save_today(&self) -> bool {
        self.wishlist_id.is_some() && !self.saved_today
    }

    /// Day the flag was last derived for.
    #[must_use]
    pub fn checked_on(&self) -> Option<NaiveDate> {
        self.checked_on
    }

    /// Whether the flag was derived for a day other than `today`.
    #[must_use]
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.checked_on != Some(today)
    }

    /// Re-derive the flag if the day changed. Returns `true` if it refreshed.
    pub fn refresh_if_stale(&mut self, ctx: &NotificationContext<'_>) -> Result<bool, CoreError> {
        if !self.is_stale(ctx.today) {
            return Ok(false);
        }
        self.refresh(ctx)?;
        Ok(true)
    }

    /// Re-derive the flag from storage for the current wishlist and today.
    pub fn refresh(&mut self, ctx: &NotificationContext<'_>) -> Result<(), CoreError> {
        self.wishlist_id = ctx.current_id().map(str::to_string);
        self.checked_on = Some(ctx.today);
        self.saved_today = match &self.wishlist_id {
            Some(id) => ctx.storage.contains_key(&keys::daily_saving(id, ctx.today))?,
            None => false,
        };
        Ok(())
    }
}

impl WishlistListener for DailySavingGate {
    fn on_notification(
        &mut self,
        notification: &Notification,
        ctx: &mut NotificationContext<'_>,
    ) -> Result<(), CoreError> {
        match notification {
            Notification::Deposit { .. } => {
                let (Some(date), Some(subject)) = (notification.deposit_date(), ctx.subject) else {
                    return Ok(());
                };
                self.refresh_if_stale(ctx)?;
                ctx.storage
                    .set_item(&keys::daily_saving(&subject.id, date), "true")?;
                if self.wishlist_id.as_deref() == Some(subject.id.as_str()) && date == ctx.today {
                    self.saved_today = true;
                    self.checked_on = Some(date);
                }
                Ok(())
            }
            Notification::Reset | Notification::SelectionChanged => self.refresh(ctx),
        }
    }

    fn attach(&mut self, ctx: &mut NotificationContext<'_>) -> Result<(), CoreError> {
        self.refresh(ctx)
    }
}
