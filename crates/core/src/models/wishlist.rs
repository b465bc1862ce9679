use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// One savings goal: the item, its target price and the progress towards it.
///
/// Persisted under the `wishlists` key with camelCase field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRecord {
    /// Unique identifier, generated at creation time
    pub id: String,

    /// Picture reference (URL or data URL)
    pub image: String,

    /// Display label, never empty
    pub name: String,

    /// Target amount in whole currency units (always positive)
    pub price: u64,

    /// Cumulative deposited amount
    pub saved: u64,

    /// Creation timestamp
    pub date_created: DateTime<Utc>,

    /// `saved >= price`, recomputed on every mutation
    pub completed: bool,

    /// Optional grouping label chosen in the target form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Optional date the user hopes to reach the target by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}

impl WishlistRecord {
    /// Build a fresh record from a validated candidate.
    pub(crate) fn from_candidate(candidate: NewWishlist, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("wishlist-{}", Uuid::new_v4()),
            image: candidate.image,
            name: candidate.name.trim().to_string(),
            price: candidate.price,
            saved: 0,
            date_created: now,
            completed: false,
            category: candidate.category,
            target_date: candidate.target_date,
        }
    }

    /// Recompute the derived completion flag.
    pub fn refresh_completed(&mut self) {
        self.completed = self.saved >= self.price;
    }

    /// Progress towards the target in percent, rounded and clamped to 100.
    /// A zero price yields 0.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        if self.price == 0 {
            return 0;
        }
        let pct = (self.saved as f64 / self.price as f64 * 100.0).round();
        pct.min(100.0) as u8
    }

    /// Amount still missing to reach the target.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.price.saturating_sub(self.saved)
    }
}

/// Candidate for a new wishlist, as submitted by the target form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWishlist {
    pub name: String,
    pub price: u64,
    pub image: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

impl NewWishlist {
    pub fn new(name: impl Into<String>, price: u64, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            image: image.into(),
            category: None,
            target_date: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }

    /// Required form fields: a non-blank name and a positive price.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        validate_price(self.price)
    }
}

/// Partial update for an existing record.
///
/// `saved` and `completed` are not patchable; only deposits and resets
/// move the saved amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistPatch {
    pub image: Option<String>,
    pub name: Option<String>,
    pub price: Option<u64>,
    pub category: Option<String>,
    pub target_date: Option<NaiveDate>,
}

impl WishlistPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image.is_none()
            && self.name.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.target_date.is_none()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Merge the given fields into `record` and refresh `completed`.
    pub(crate) fn apply_to(self, record: &mut WishlistRecord) {
        if let Some(image) = self.image {
            record.image = image;
        }
        if let Some(name) = self.name {
            record.name = name.trim().to_string();
        }
        if let Some(price) = self.price {
            record.price = price;
        }
        if let Some(category) = self.category {
            record.category = Some(category);
        }
        if let Some(date) = self.target_date {
            record.target_date = Some(date);
        }
        record.refresh_completed();
    }
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::ValidationError("Wishlist name must not be empty".into()));
    }
    Ok(())
}

fn validate_price(price: u64) -> Result<(), CoreError> {
    if price == 0 {
        return Err(CoreError::ValidationError(
            "Wishlist price must be greater than zero".into(),
        ));
    }
    Ok(())
}
