//! `campus-menu`: which navigation entries an actor may see.
//!
//! Visibility is derived from the current [`CapabilitySet`] on every call;
//! nothing here is stored between snapshots.
//!
//! [`CapabilitySet`]: campus_auth::CapabilitySet

pub mod item;
pub mod visibility;

pub use item::{MenuCategory, MenuItem, default_menu, items_from_value};
pub use visibility::{MenuSection, filter, is_category_visible, sections, visible_categories};
