use serde::{Deserialize, Serialize};

use super::wishlist::WishlistRecord;

/// Everything the store owns: the record collection and the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistState {
    /// All wishlists, in insertion order
    pub wishlists: Vec<WishlistRecord>,

    /// Id of the record deposits are made against.
    /// A dangling id means no record is current.
    pub current_wishlist_id: Option<String>,
}

impl WishlistState {
    /// State holding a single record, which is also current.
    pub fn seeded(record: WishlistRecord) -> Self {
        Self {
            current_wishlist_id: Some(record.id.clone()),
            wishlists: vec![record],
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WishlistRecord> {
        self.wishlists.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut WishlistRecord> {
        self.wishlists.iter_mut().find(|w| w.id == id)
    }

    #[must_use]
    pub fn current(&self) -> Option<&WishlistRecord> {
        self.current_wishlist_id.as_deref().and_then(|id| self.get(id))
    }

    #[must_use]
    pub fn is_current(&self, id: &str) -> bool {
        self.current_wishlist_id.as_deref() == Some(id)
    }
}
