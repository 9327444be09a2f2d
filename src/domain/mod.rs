pub mod board;
pub mod item;
pub mod list;
pub mod sorting;
pub mod validate;

pub use board::{BoardSnapshot, DragRef};
pub use item::{Item, ItemId, ItemPatch, Priority};
pub use list::{List, ListId};
pub use sorting::{sort_items, SortField, SortOrder};
