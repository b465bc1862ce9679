pub mod clock;
pub mod wishlist_service;
