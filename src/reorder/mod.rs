//! Drag-and-drop reorder engine.
//!
//! A drop is handled in two phases. [`compute_moves`] classifies the gesture
//! against an immutable [`BoardSnapshot`] and returns the store writes needed
//! to keep every touched sequence packed `0..n-1`. [`apply_writes`] then runs
//! those writes against a [`BoardStore`](crate::storage::BoardStore).

use crate::domain::{BoardSnapshot, DragRef, ItemId, ItemPatch, ListId};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

mod apply;

pub use apply::apply_writes;

/// Kind of gesture a drop was classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ListReorder,
    ItemReorder,
    ItemMove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListReorder => write!(f, "list reorder"),
            Self::ItemReorder => write!(f, "item reorder"),
            Self::ItemMove => write!(f, "item move"),
        }
    }
}

/// One write against the board store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreWrite {
    ListPosition { id: ListId, position: i64 },
    Item { id: ItemId, patch: ItemPatch },
}

/// Writes required to carry out one classified drop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderPlan {
    pub operation: Operation,
    pub writes: Vec<StoreWrite>,
}

/// Result of classifying a drop
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The drop leaves the arrangement unchanged; nothing to write
    NoOp,
    Planned(ReorderPlan),
}

impl MoveOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    pub fn writes(&self) -> &[StoreWrite] {
        match self {
            Self::NoOp => &[],
            Self::Planned(plan) => &plan.writes,
        }
    }
}

/// Classifies a drop of `active_id` onto `over_id` and plans the writes.
///
/// Both ids are opaque strings from the presentation layer. Either failing to
/// resolve is `NotFound` and nothing is planned.
pub fn compute_moves(snapshot: &BoardSnapshot, active_id: &str, over_id: &str) -> Result<MoveOutcome> {
    let active = snapshot.resolve(active_id)?;
    let over = snapshot.resolve(over_id)?;

    let outcome = match active {
        DragRef::List { .. } if active == over => MoveOutcome::NoOp,
        DragRef::List { id } => plan_list_reorder(snapshot, id, over.container()),
        DragRef::Item { id, list_id } if list_id == over.container() => {
            plan_item_reorder(snapshot, id, list_id, over)
        }
        DragRef::Item { id, list_id } => plan_item_move(snapshot, id, list_id, over.container()),
    };

    match &outcome {
        MoveOutcome::NoOp => tracing::debug!(active_id, over_id, "drop is a no-op"),
        MoveOutcome::Planned(plan) => tracing::debug!(
            active_id,
            over_id,
            operation = %plan.operation,
            writes = plan.writes.len(),
            "planned drop"
        ),
    }

    Ok(outcome)
}

fn plan_list_reorder(snapshot: &BoardSnapshot, active: ListId, target: ListId) -> MoveOutcome {
    let lists = list_sequence(snapshot);

    let Some(moved) = move_within(&lists, &active, &target) else {
        return MoveOutcome::NoOp;
    };

    MoveOutcome::Planned(ReorderPlan {
        operation: Operation::ListReorder,
        writes: list_position_writes(&moved),
    })
}

fn plan_item_reorder(
    snapshot: &BoardSnapshot,
    active: ItemId,
    list_id: ListId,
    over: DragRef,
) -> MoveOutcome {
    let items = item_sequence(snapshot, &list_id);

    // Dropping onto the list container itself sends the item to the end
    let target = match over {
        DragRef::Item { id, .. } => id,
        DragRef::List { .. } => match items.last() {
            Some((last, _)) => *last,
            None => return MoveOutcome::NoOp,
        },
    };

    let Some(moved) = move_within(&items, &active, &target) else {
        return MoveOutcome::NoOp;
    };

    MoveOutcome::Planned(ReorderPlan {
        operation: Operation::ItemReorder,
        writes: item_position_writes(&moved),
    })
}

fn plan_item_move(
    snapshot: &BoardSnapshot,
    active: ItemId,
    source: ListId,
    target: ListId,
) -> MoveOutcome {
    let remaining: Vec<(ItemId, i64)> = item_sequence(snapshot, &source)
        .into_iter()
        .filter(|(id, _)| id != &active)
        .collect();
    let destination = item_sequence(snapshot, &target);

    // The ownership change goes first so a failure on a later write never
    // leaves the item in two lists or in none.
    let mut writes = vec![StoreWrite::Item {
        id: active,
        patch: ItemPatch::relocate(target, destination.len() as i64),
    }];
    writes.extend(item_position_writes(&remaining));
    writes.extend(item_position_writes(&destination));

    MoveOutcome::Planned(ReorderPlan {
        operation: Operation::ItemMove,
        writes,
    })
}

/// Writes that pack the board's lists back to `0..n-1`
pub fn repack_lists(snapshot: &BoardSnapshot) -> Vec<StoreWrite> {
    list_position_writes(&list_sequence(snapshot))
}

/// Writes that pack one list's items back to `0..n-1`
pub fn repack_items(snapshot: &BoardSnapshot, list_id: &ListId) -> Vec<StoreWrite> {
    item_position_writes(&item_sequence(snapshot, list_id))
}

fn list_sequence(snapshot: &BoardSnapshot) -> Vec<(ListId, i64)> {
    snapshot
        .sorted_lists()
        .iter()
        .map(|list| (list.id, list.position))
        .collect()
}

fn list_position_writes(sequence: &[(ListId, i64)]) -> Vec<StoreWrite> {
    repack(sequence)
        .into_iter()
        .map(|(id, position)| StoreWrite::ListPosition { id, position })
        .collect()
}

fn item_sequence(snapshot: &BoardSnapshot, list_id: &ListId) -> Vec<(ItemId, i64)> {
    snapshot
        .items_in(list_id)
        .iter()
        .map(|item| (item.id, item.position))
        .collect()
}

fn item_position_writes(sequence: &[(ItemId, i64)]) -> Vec<StoreWrite> {
    repack(sequence)
        .into_iter()
        .map(|(id, position)| StoreWrite::Item {
            id,
            patch: ItemPatch::position(position),
        })
        .collect()
}

/// Moves `active` to the index currently held by `target`.
///
/// Returns `None` when either is missing or the indices coincide.
fn move_within<I: Copy + PartialEq>(sequence: &[(I, i64)], active: &I, target: &I) -> Option<Vec<(I, i64)>> {
    let old_index = sequence.iter().position(|(id, _)| id == active)?;
    let new_index = sequence.iter().position(|(id, _)| id == target)?;
    if old_index == new_index {
        return None;
    }

    let mut moved = sequence.to_vec();
    let entry = moved.remove(old_index);
    moved.insert(new_index, entry);
    Some(moved)
}

/// New positions for every entry whose position differs from its index
fn repack<I: Copy>(sequence: &[(I, i64)]) -> Vec<(I, i64)> {
    sequence
        .iter()
        .enumerate()
        .filter(|(index, (_, position))| *position != *index as i64)
        .map(|(index, (id, _))| (*id, index as i64))
        .collect()
}
