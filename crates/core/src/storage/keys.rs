//! Key layout of the persisted state.
//!
//! Store-owned keys are fixed; every display-side key is scoped by wishlist id.

use chrono::{Datelike, NaiveDate};

/// JSON array of every `WishlistRecord`.
pub const WISHLISTS: &str = "wishlists";

/// Raw id of the current wishlist.
pub const CURRENT_WISHLIST_ID: &str = "currentWishlistId";

/// Day-indexed savings log kept by the calendar.
pub fn calendar(wishlist_id: &str) -> String {
    format!("calendar-{wishlist_id}")
}

/// Deposit history kept by the checklist.
pub fn checklist(wishlist_id: &str) -> String {
    format!("checklist-{wishlist_id}")
}

/// Presence flag: a deposit was already made on `date` for this wishlist.
pub fn daily_saving(wishlist_id: &str, date: NaiveDate) -> String {
    format!(
        "dailySaving-{wishlist_id}-{}-{}-{}",
        date.day(),
        date.month(),
        date.year()
    )
}

/// One-shot flag suppressing repeat completion animations.
pub fn celebration(wishlist_id: &str) -> String {
    format!("celebration-{wishlist_id}")
}

/// Whether `key` is a daily-saving flag of exactly this wishlist.
///
/// Ids may themselves contain dashes, so a plain prefix match is not enough:
/// the remainder must be a `day-month-year` triple.
pub fn is_daily_saving_of(key: &str, wishlist_id: &str) -> bool {
    let Some(rest) = key
        .strip_prefix("dailySaving-")
        .and_then(|k| k.strip_prefix(wishlist_id))
        .and_then(|k| k.strip_prefix('-'))
    else {
        return false;
    };
    let parts: Vec<&str> = rest.split('-').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// Every key scoped to `wishlist_id` among `keys`.
pub fn scoped_to<'a>(keys: &'a [String], wishlist_id: &str) -> Vec<&'a str> {
    let calendar = calendar(wishlist_id);
    let checklist = checklist(wishlist_id);
    let celebration = celebration(wishlist_id);
    keys.iter()
        .map(String::as_str)
        .filter(|k| {
            *k == calendar
                || *k == checklist
                || *k == celebration
                || is_daily_saving_of(k, wishlist_id)
        })
        .collect()
}
