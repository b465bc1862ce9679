pub mod notification;
pub mod savings_log;
pub mod settings;
pub mod state;
pub mod wishlist;
