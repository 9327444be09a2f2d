use crate::domain::{
    item::{Item, ItemId},
    list::{List, ListId},
};
use crate::error::{BoardError, Result};
use crate::reorder::StoreWrite;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// What a raw drag id refers to, resolved against a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRef {
    List { id: ListId },
    Item { id: ItemId, list_id: ListId },
}

impl DragRef {
    /// The list that contains this entity (the list itself for lists)
    pub fn container(&self) -> ListId {
        match self {
            Self::List { id } => *id,
            Self::Item { list_id, .. } => *list_id,
        }
    }
}

/// Immutable view of every list and item on the board at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub lists: Vec<List>,
    pub items: Vec<Item>,
}

impl BoardSnapshot {
    pub fn new(lists: Vec<List>, items: Vec<Item>) -> Self {
        Self { lists, items }
    }

    pub fn list(&self, id: &ListId) -> Option<&List> {
        self.lists.iter().find(|list| &list.id == id)
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Lists in display order
    pub fn sorted_lists(&self) -> Vec<&List> {
        let mut lists: Vec<&List> = self.lists.iter().collect();
        lists.sort_by(|a, b| {
            by_position((a.position, a.created_at), (b.position, b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        lists
    }

    /// Items of one list in display order
    pub fn items_in(&self, list_id: &ListId) -> Vec<&Item> {
        let mut items: Vec<&Item> = self
            .items
            .iter()
            .filter(|item| &item.list_id == list_id)
            .collect();
        items.sort_by(|a, b| {
            by_position((a.position, a.created_at), (b.position, b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        items
    }

    /// Position a newly appended list receives, one past the highest in use
    pub fn next_list_position(&self) -> i64 {
        after_last(self.lists.iter().map(|list| list.position))
    }

    /// Position a newly appended item in `list_id` receives.
    ///
    /// Sequences may carry gaps, so this is one past the highest position
    /// rather than the sibling count.
    pub fn next_item_position(&self, list_id: &ListId) -> i64 {
        after_last(
            self.items
                .iter()
                .filter(|item| &item.list_id == list_id)
                .map(|item| item.position),
        )
    }

    /// Resolves an opaque drag id to a list or an item.
    ///
    /// List ids are checked first; an id that parses but matches nothing, or
    /// does not parse at all, is `NotFound`.
    pub fn resolve(&self, raw: &str) -> Result<DragRef> {
        if let Ok(id) = ListId::from_str(raw) {
            if self.list(&id).is_some() {
                return Ok(DragRef::List { id });
            }
        }
        if let Ok(id) = ItemId::from_str(raw) {
            if let Some(item) = self.item(&id) {
                // An item whose list is gone cannot be placed anywhere
                if self.list(&item.list_id).is_none() {
                    return Err(BoardError::NotFound(raw.to_string()));
                }
                return Ok(DragRef::Item {
                    id,
                    list_id: item.list_id,
                });
            }
        }
        Err(BoardError::NotFound(raw.to_string()))
    }

    /// Whether the board's lists and every list's items are packed 0..n-1
    pub fn is_contiguous(&self) -> bool {
        let lists_ok = self
            .sorted_lists()
            .iter()
            .enumerate()
            .all(|(index, list)| list.position == index as i64);

        lists_ok
            && self.lists.iter().all(|list| {
                self.items_in(&list.id)
                    .iter()
                    .enumerate()
                    .all(|(index, item)| item.position == index as i64)
            })
    }

    /// Applies planned writes to this snapshot in place.
    ///
    /// Used for optimistic rendering before the store confirms. Writes that
    /// target unknown ids are reported as errors and leave earlier writes
    /// applied, mirroring what a store would do.
    pub fn apply(&mut self, writes: &[StoreWrite]) -> Result<()> {
        for write in writes {
            match write {
                StoreWrite::ListPosition { id, position } => {
                    let list = self
                        .lists
                        .iter_mut()
                        .find(|list| &list.id == id)
                        .ok_or_else(|| BoardError::ListNotFound(id.to_string()))?;
                    list.set_position(*position);
                }
                StoreWrite::Item { id, patch } => {
                    let item = self
                        .items
                        .iter_mut()
                        .find(|item| &item.id == id)
                        .ok_or_else(|| BoardError::ItemNotFound(id.to_string()))?;
                    item.apply_patch(patch);
                }
            }
        }
        Ok(())
    }

    /// Items assigned to `assignee`, compared case-insensitively
    pub fn items_assigned_to(&self, assignee: &str) -> Vec<&Item> {
        let needle = assignee.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                item.assigned_to
                    .as_ref()
                    .map(|a| a.to_lowercase() == needle)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Items whose due date falls in `[start, end)`
    pub fn items_due_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| {
                item.due_date
                    .map(|due| due >= start && due < end)
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn overdue_items(&self, now: DateTime<Utc>) -> Vec<&Item> {
        self.items.iter().filter(|item| item.is_overdue(now)).collect()
    }
}

fn after_last(positions: impl Iterator<Item = i64>) -> i64 {
    positions.max().map_or(0, |last| last + 1)
}

/// Position first, then creation time for siblings that share a position
fn by_position(a: (i64, DateTime<Utc>), b: (i64, DateTime<Utc>)) -> Ordering {
    a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1))
}
