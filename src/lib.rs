//! # Taskboard Core
//!
//! Domain models and the drag-and-drop reorder engine for a back-office
//! to-do board.
//!
//! Lists and items carry integer positions. A drop gesture is classified
//! and turned into store writes by [`reorder::compute_moves`], which keeps
//! every touched sequence packed `0..n-1`; [`reorder::apply_writes`] runs
//! those writes against any [`BoardStore`]. [`BoardService`] ties the two
//! together with creation, editing and deletion.

pub mod config;
pub mod domain;
pub mod error;
pub mod reorder;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use config::{BoardConfig, DeletePolicy};
pub use domain::{
    board::{BoardSnapshot, DragRef},
    item::{Item, ItemId, ItemPatch, Priority},
    list::{List, ListId},
};
pub use error::{BoardError, Result};
pub use reorder::{apply_writes, compute_moves, MoveOutcome, Operation, ReorderPlan, StoreWrite};
pub use service::{BoardService, DropResult, NewItem};
pub use storage::BoardStore;
