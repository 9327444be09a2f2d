use crate::{
    config::BoardConfig,
    domain::{BoardSnapshot, Item, ItemId, ItemPatch, List, ListId},
    error::{BoardError, Result},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

/// Persistence contract for lists and items.
///
/// Implementations are last-write-wins and hold no locks across calls.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Checks if the board has been initialized
    async fn is_initialized(&self) -> bool;

    async fn load_config(&self) -> Result<BoardConfig>;

    async fn save_config(&self, config: &BoardConfig) -> Result<()>;

    /// Every list on the board, in no particular order
    async fn list_all_lists(&self) -> Result<Vec<List>>;

    /// Every item on the board, in no particular order
    async fn list_all_items(&self) -> Result<Vec<Item>>;

    async fn create_list(&self, list: &List) -> Result<()>;

    async fn create_item(&self, item: &Item) -> Result<()>;

    async fn update_list_position(&self, id: &ListId, position: i64) -> Result<()>;

    async fn rename_list(&self, id: &ListId, title: &str) -> Result<()>;

    /// Applies the fields present in `patch` to one item
    async fn update_item(&self, id: &ItemId, patch: &ItemPatch) -> Result<()>;

    /// Deletes a list row; its items are not touched
    async fn delete_list(&self, id: &ListId) -> Result<()>;

    async fn delete_item(&self, id: &ItemId) -> Result<()>;

    /// Reads lists and items into one snapshot
    async fn load_snapshot(&self) -> Result<BoardSnapshot> {
        let lists = self.list_all_lists().await?;
        let items = self.list_all_items().await?;
        Ok(BoardSnapshot::new(lists, items))
    }
}

/// Whole-board document shared by the in-memory and JSON file backends
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardDocument {
    pub config: BoardConfig,
    #[serde(default)]
    pub lists: Vec<List>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl BoardDocument {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            lists: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn insert_list(&mut self, list: &List) -> Result<()> {
        if self.lists.iter().any(|l| l.id == list.id) {
            return Err(BoardError::Store(format!("list {} already exists", list.id)));
        }
        self.lists.push(list.clone());
        Ok(())
    }

    pub fn insert_item(&mut self, item: &Item) -> Result<()> {
        if self.items.iter().any(|i| i.id == item.id) {
            return Err(BoardError::Store(format!("item {} already exists", item.id)));
        }
        if !self.lists.iter().any(|l| l.id == item.list_id) {
            return Err(BoardError::ListNotFound(item.list_id.to_string()));
        }
        self.items.push(item.clone());
        Ok(())
    }

    fn list_mut(&mut self, id: &ListId) -> Result<&mut List> {
        self.lists
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| BoardError::ListNotFound(id.to_string()))
    }

    pub fn update_list_position(&mut self, id: &ListId, position: i64) -> Result<()> {
        self.list_mut(id)?.set_position(position);
        Ok(())
    }

    pub fn rename_list(&mut self, id: &ListId, title: &str) -> Result<()> {
        self.list_mut(id)?.set_title(title.to_string());
        Ok(())
    }

    pub fn update_item(&mut self, id: &ItemId, patch: &ItemPatch) -> Result<()> {
        if let Some(list_id) = &patch.list_id {
            if !self.lists.iter().any(|l| &l.id == list_id) {
                return Err(BoardError::ListNotFound(list_id.to_string()));
            }
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or_else(|| BoardError::ItemNotFound(id.to_string()))?;
        item.apply_patch(patch);
        Ok(())
    }

    pub fn remove_list(&mut self, id: &ListId) -> Result<()> {
        let before = self.lists.len();
        self.lists.retain(|l| &l.id != id);
        if self.lists.len() == before {
            return Err(BoardError::ListNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn remove_item(&mut self, id: &ItemId) -> Result<()> {
        let before = self.items.len();
        self.items.retain(|i| &i.id != id);
        if self.items.len() == before {
            return Err(BoardError::ItemNotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_item_requires_list() {
        let mut doc = BoardDocument::default();
        let item = Item::new(ListId::new(), "Orphan".to_string(), 0);
        assert!(matches!(doc.insert_item(&item), Err(BoardError::ListNotFound(_))));
    }

    #[test]
    fn test_duplicate_list_rejected() {
        let mut doc = BoardDocument::default();
        let list = List::new("Todo".to_string(), 0);
        doc.insert_list(&list).unwrap();
        assert!(matches!(doc.insert_list(&list), Err(BoardError::Store(_))));
    }

    #[test]
    fn test_update_item_to_unknown_list_rejected() {
        let mut doc = BoardDocument::default();
        let list = List::new("Todo".to_string(), 0);
        let item = Item::new(list.id, "Task".to_string(), 0);
        doc.insert_list(&list).unwrap();
        doc.insert_item(&item).unwrap();

        let result = doc.update_item(&item.id, &ItemPatch::relocate(ListId::new(), 0));

        assert!(matches!(result, Err(BoardError::ListNotFound(_))));
        assert_eq!(doc.items[0].list_id, list.id);
    }

    #[test]
    fn test_remove_unknown_ids() {
        let mut doc = BoardDocument::default();
        assert!(matches!(doc.remove_list(&ListId::new()), Err(BoardError::ListNotFound(_))));
        assert!(matches!(doc.remove_item(&ItemId::new()), Err(BoardError::ItemNotFound(_))));
    }
}
