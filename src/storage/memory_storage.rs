use crate::{
    config::BoardConfig,
    domain::{Item, ItemId, ItemPatch, List, ListId},
    error::{BoardError, Result},
    storage::{BoardDocument, BoardStore},
};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-process board store, mainly for tests and previews
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: RwLock<Option<BoardDocument>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an already initialized store with the given configuration
    pub fn with_config(config: BoardConfig) -> Self {
        Self {
            document: RwLock::new(Some(BoardDocument::new(config))),
        }
    }

    async fn read<T>(&self, f: impl FnOnce(&BoardDocument) -> T) -> Result<T> {
        let guard = self.document.read().await;
        let doc = guard.as_ref().ok_or(BoardError::BoardNotInitialized)?;
        Ok(f(doc))
    }

    async fn write(&self, f: impl FnOnce(&mut BoardDocument) -> Result<()>) -> Result<()> {
        let mut guard = self.document.write().await;
        let doc = guard.as_mut().ok_or(BoardError::BoardNotInitialized)?;
        f(doc)
    }
}

#[async_trait]
impl BoardStore for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        let mut guard = self.document.write().await;
        if guard.is_none() {
            *guard = Some(BoardDocument::default());
        }
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.document.read().await.is_some()
    }

    async fn load_config(&self) -> Result<BoardConfig> {
        self.read(|doc| doc.config.clone()).await
    }

    async fn save_config(&self, config: &BoardConfig) -> Result<()> {
        self.write(|doc| {
            doc.config = config.clone();
            Ok(())
        })
        .await
    }

    async fn list_all_lists(&self) -> Result<Vec<List>> {
        self.read(|doc| doc.lists.clone()).await
    }

    async fn list_all_items(&self) -> Result<Vec<Item>> {
        self.read(|doc| doc.items.clone()).await
    }

    async fn create_list(&self, list: &List) -> Result<()> {
        self.write(|doc| doc.insert_list(list)).await
    }

    async fn create_item(&self, item: &Item) -> Result<()> {
        self.write(|doc| doc.insert_item(item)).await
    }

    async fn update_list_position(&self, id: &ListId, position: i64) -> Result<()> {
        self.write(|doc| doc.update_list_position(id, position)).await
    }

    async fn rename_list(&self, id: &ListId, title: &str) -> Result<()> {
        self.write(|doc| doc.rename_list(id, title)).await
    }

    async fn update_item(&self, id: &ItemId, patch: &ItemPatch) -> Result<()> {
        self.write(|doc| doc.update_item(id, patch)).await
    }

    async fn delete_list(&self, id: &ListId) -> Result<()> {
        self.write(|doc| doc.remove_list(id)).await
    }

    async fn delete_item(&self, id: &ItemId) -> Result<()> {
        self.write(|doc| doc.remove_item(id)).await
    }
}
