use serde::{Deserialize, Serialize};

/// Record created when storage holds no wishlists yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedWishlist {
    pub id: String,
    pub name: String,
    pub image: String,
    pub price: u64,
    pub saved: u64,
}

impl Default for SeedWishlist {
    fn default() -> Self {
        Self {
            id: "default-wishlist".to_string(),
            name: "Laptop Baru".to_string(),
            image: "https://images.unsplash.com/photo-1496181133206-80ce9b88a853?q=80&w=500&auto=format&fit=crop"
                .to_string(),
            price: 10_000_000,
            saved: 2_500_000,
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Seed used on first launch.
    pub seed: SeedWishlist,

    /// Note given to checklist entries that were logged without one.
    pub default_checklist_note: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: SeedWishlist::default(),
            default_checklist_note: "Tabungan harian".to_string(),
        }
    }
}
