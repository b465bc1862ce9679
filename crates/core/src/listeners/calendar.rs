use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::notification::Notification;
use crate::models::savings_log::CalendarDay;
use crate::storage::keys;
use crate::storage::manager::StorageManager;
use crate::storage::traits::KeyValueStorage;

use super::{NotificationContext, WishlistListener};

/// Day-indexed savings log of the current wishlist, persisted under
/// `calendar-<wishlistId>`. Deposits on the same day are merged.
#[derive(Debug, Clone, Default)]
pub struct SavingsCalendar {
    wishlist_id: Option<String>,
    days: Vec<CalendarDay>,
}

impl SavingsCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wishlist whose log is loaded.
    #[must_use]
    pub fn wishlist_id(&self) -> Option<&str> {
        self.wishlist_id.as_deref()
    }

    /// Logged days, oldest first.
    #[must_use]
    pub fn days(&self) -> &[CalendarDay] {
        &self.days
    }

    #[must_use]
    pub fn amount_on(&self, date: NaiveDate) -> u64 {
        self.days
            .iter()
            .find(|d| d.is_on(date))
            .map_or(0, |d| d.amount)
    }

    #[must_use]
    pub fn has_savings(&self, date: NaiveDate) -> bool {
        self.days.iter().any(|d| d.is_on(date))
    }

    /// Days logged in the given month (1-based).
    #[must_use]
    pub fn month_entries(&self, year: i32, month: u32) -> Vec<&CalendarDay> {
        self.days
            .iter()
            .filter(|d| d.year == year && d.month == month)
            .collect()
    }

    #[must_use]
    pub fn month_total(&self, year: i32, month: u32) -> u64 {
        self.month_entries(year, month).iter().map(|d| d.amount).sum()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.days.iter().map(|d| d.amount).sum()
    }

    fn reload(&mut self, ctx: &NotificationContext<'_>) -> Result<(), CoreError> {
        self.days.clear();
        self.wishlist_id = ctx.current_id().map(str::to_string);
        if let Some(id) = &self.wishlist_id {
            self.days = Self::load(&*ctx.storage, id)?;
        }
        Ok(())
    }

    fn load(storage: &dyn KeyValueStorage, wishlist_id: &str) -> Result<Vec<CalendarDay>, CoreError> {
        Ok(StorageManager::read_json::<Vec<CalendarDay>, _>(storage, &keys::calendar(wishlist_id))?
            .unwrap_or_default())
    }

    fn merge(days: &mut Vec<CalendarDay>, date: NaiveDate, amount: u64) {
        match days.iter_mut().find(|d| d.is_on(date)) {
            Some(day) => day.amount = day.amount.saturating_add(amount),
            None => {
                let pos = days.partition_point(|d| d.date().is_some_and(|existing| existing < date));
                days.insert(pos, CalendarDay::new(date, amount));
            }
        }
    }
}

impl WishlistListener for SavingsCalendar {
    fn on_notification(
        &mut self,
        notification: &Notification,
        ctx: &mut NotificationContext<'_>,
    ) -> Result<(), CoreError> {
        match notification {
            Notification::Deposit { amount, .. } => {
                let (Some(date), Some(subject)) = (notification.deposit_date(), ctx.subject) else {
                    return Ok(());
                };
                let key = keys::calendar(&subject.id);

                if self.wishlist_id.as_deref() == Some(subject.id.as_str()) {
                    Self::merge(&mut self.days, date, *amount);
                    StorageManager::write_json(&mut *ctx.storage, &key, &self.days)
                } else {
                    // Deposit on a wishlist that is not on screen
                    let mut days = Self::load(&*ctx.storage, &subject.id)?;
                    Self::merge(&mut days, date, *amount);
                    StorageManager::write_json(&mut *ctx.storage, &key, &days)
                }
            }
            Notification::Reset | Notification::SelectionChanged => self.reload(ctx),
        }
    }

    fn attach(&mut self, ctx: &mut NotificationContext<'_>) -> Result<(), CoreError> {
        self.reload(ctx)
    }
}
