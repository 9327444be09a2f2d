//! Board operations on top of a [`BoardStore`].
//!
//! Everything that assigns positions (creating, deleting, dropping) runs
//! behind one gate so two such operations on the same service never
//! interleave their reads and writes.

use crate::{
    config::{BoardConfig, DeletePolicy},
    domain::{validate, BoardSnapshot, Item, ItemId, ItemPatch, List, ListId, Priority},
    error::{BoardError, Result},
    reorder::{self, MoveOutcome, Operation, StoreWrite},
    storage::BoardStore,
};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

/// Fields for a new item; it is always appended to the end of its list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewItem {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<String>,
}

impl NewItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn assigned_to(mut self, assignee: impl Into<String>) -> Self {
        self.assigned_to = Some(assignee.into());
        self
    }
}

/// What a drop did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropResult {
    NoOp,
    Applied { operation: Operation, writes: usize },
}

pub struct BoardService<S> {
    store: S,
    position_gate: Mutex<()>,
}

impl<S: BoardStore> BoardService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            position_gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Initializes the store and seeds the configured lists on an empty board
    pub async fn initialize(&self) -> Result<()> {
        let _gate = self.position_gate.lock().await;
        self.store.initialize().await?;

        let config = self.store.load_config().await?;
        if !self.store.list_all_lists().await?.is_empty() {
            return Ok(());
        }

        for (position, title) in config.default_lists.iter().enumerate() {
            let list = List::new(validate::title(title)?, position as i64);
            self.store.create_list(&list).await?;
        }
        tracing::info!(
            board = %config.name,
            lists = config.default_lists.len(),
            "seeded empty board"
        );
        Ok(())
    }

    pub async fn config(&self) -> Result<BoardConfig> {
        self.store.load_config().await
    }

    /// Fresh read of the whole board
    pub async fn snapshot(&self) -> Result<BoardSnapshot> {
        self.store.load_snapshot().await
    }

    pub async fn add_list(&self, title: &str) -> Result<List> {
        let title = validate::title(title)?;

        let _gate = self.position_gate.lock().await;
        let position = self.store.load_snapshot().await?.next_list_position();
        let list = List::new(title, position);
        self.store.create_list(&list).await?;

        tracing::info!(list_id = %list.id, position, "created list");
        Ok(list)
    }

    pub async fn add_item(&self, list_id: &ListId, new_item: NewItem) -> Result<Item> {
        let title = validate::title(&new_item.title)?;
        let assigned_to = match &new_item.assigned_to {
            Some(raw) => validate::assignee(raw)?,
            None => None,
        };

        let _gate = self.position_gate.lock().await;
        let snapshot = self.store.load_snapshot().await?;
        if snapshot.list(list_id).is_none() {
            return Err(BoardError::ListNotFound(list_id.to_string()));
        }

        let mut item = Item::new(*list_id, title, snapshot.next_item_position(list_id));
        item.description = new_item.description.as_deref().and_then(validate::description);
        item.due_date = new_item.due_date;
        item.priority = new_item.priority;
        item.assigned_to = assigned_to;
        self.store.create_item(&item).await?;

        tracing::info!(item_id = %item.id, %list_id, position = item.position, "created item");
        Ok(item)
    }

    pub async fn rename_list(&self, id: &ListId, title: &str) -> Result<()> {
        let title = validate::title(title)?;
        self.store.rename_list(id, &title).await
    }

    /// Edits an item's details.
    ///
    /// Placement is owned by [`handle_drop`](Self::handle_drop), so a patch
    /// that sets `list_id` or `position` is rejected.
    pub async fn edit_item(&self, id: &ItemId, mut patch: ItemPatch) -> Result<()> {
        if patch.list_id.is_some() || patch.position.is_some() {
            return Err(BoardError::invalid(
                "position",
                "items are moved by dropping them, not by editing",
            ));
        }

        if let Some(title) = &patch.title {
            patch.title = Some(validate::title(title)?);
        }
        if let Some(Some(assignee)) = &patch.assigned_to {
            patch.assigned_to = Some(validate::assignee(assignee)?);
        }
        if let Some(Some(description)) = &patch.description {
            patch.description = Some(validate::description(description));
        }
        if patch.is_empty() {
            let items = self.store.list_all_items().await?;
            if !items.iter().any(|item| &item.id == id) {
                return Err(BoardError::ItemNotFound(id.to_string()));
            }
            return Ok(());
        }

        self.store.update_item(id, &patch).await
    }

    /// Deletes an item, repacking its former siblings unless configured not to
    pub async fn delete_item(&self, id: &ItemId) -> Result<()> {
        let _gate = self.position_gate.lock().await;
        let mut snapshot = self.store.load_snapshot().await?;
        let list_id = snapshot
            .item(id)
            .map(|item| item.list_id)
            .ok_or_else(|| BoardError::ItemNotFound(id.to_string()))?;
        let policy = self.store.load_config().await?.delete_policy;

        self.store.delete_item(id).await?;
        tracing::info!(item_id = %id, %list_id, "deleted item");

        snapshot.items.retain(|item| &item.id != id);
        let writes = match policy {
            DeletePolicy::Repack => reorder::repack_items(&snapshot, &list_id),
            DeletePolicy::LeaveGaps => Vec::new(),
        };
        self.finish_after(1, &writes).await
    }

    /// Deletes a list together with its items
    pub async fn delete_list(&self, id: &ListId) -> Result<()> {
        let _gate = self.position_gate.lock().await;
        let mut snapshot = self.store.load_snapshot().await?;
        if snapshot.list(id).is_none() {
            return Err(BoardError::ListNotFound(id.to_string()));
        }
        let policy = self.store.load_config().await?.delete_policy;

        let doomed: Vec<ItemId> = snapshot.items_in(id).iter().map(|item| item.id).collect();
        let total = doomed.len() + 1;
        for (landed, item_id) in doomed.iter().enumerate() {
            if let Err(err) = self.store.delete_item(item_id).await {
                return Err(partial(landed, total, err));
            }
        }
        if let Err(err) = self.store.delete_list(id).await {
            return Err(partial(doomed.len(), total, err));
        }
        tracing::info!(list_id = %id, items = doomed.len(), "deleted list");

        snapshot.lists.retain(|list| &list.id != id);
        snapshot.items.retain(|item| &item.list_id != id);
        let writes = match policy {
            DeletePolicy::Repack => reorder::repack_lists(&snapshot),
            DeletePolicy::LeaveGaps => Vec::new(),
        };
        self.finish_after(total, &writes).await
    }

    /// Handles one drag-end gesture against a fresh snapshot.
    ///
    /// On any error the caller should reload the board before retrying;
    /// see [`BoardError::requires_reload`].
    pub async fn handle_drop(&self, active_id: &str, over_id: &str) -> Result<DropResult> {
        let _gate = self.position_gate.lock().await;
        let snapshot = self.store.load_snapshot().await?;

        let plan = match reorder::compute_moves(&snapshot, active_id, over_id)? {
            MoveOutcome::NoOp => return Ok(DropResult::NoOp),
            MoveOutcome::Planned(plan) => plan,
        };

        reorder::apply_writes(&self.store, &plan.writes).await?;
        tracing::info!(
            active_id,
            over_id,
            operation = %plan.operation,
            writes = plan.writes.len(),
            "applied drop"
        );

        Ok(DropResult::Applied {
            operation: plan.operation,
            writes: plan.writes.len(),
        })
    }

    /// Applies follow-up writes after `landed` writes already succeeded
    async fn finish_after(&self, landed: usize, writes: &[StoreWrite]) -> Result<()> {
        match reorder::apply_writes(&self.store, writes).await {
            Ok(()) => Ok(()),
            Err(BoardError::PartialFailure {
                applied,
                total,
                source,
            }) => Err(BoardError::PartialFailure {
                applied: applied + landed,
                total: total + landed,
                source,
            }),
            Err(err) => Err(partial(landed, landed + writes.len(), err)),
        }
    }
}

/// Wraps `err` as a partial failure unless nothing had landed yet
fn partial(applied: usize, total: usize, err: BoardError) -> BoardError {
    if applied == 0 {
        return err;
    }
    tracing::warn!(applied, total, error = %err, "board left partially updated");
    BoardError::PartialFailure {
        applied,
        total,
        source: Box::new(err),
    }
}
