use crate::{
    config::BoardConfig,
    domain::{Item, ItemId, ItemPatch, List, ListId},
    error::{BoardError, Result},
    storage::{BoardDocument, BoardStore},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};

/// File-based storage implementation.
///
/// The whole board lives in one JSON document. Every mutation is a
/// read-modify-write of that document, serialized through `write_lock`.
pub struct FileStorage {
    root_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    const BOARD_DIR: &'static str = ".taskboard";
    const BOARD_FILE: &'static str = "board.json";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::BOARD_DIR),
            write_lock: Mutex::new(()),
        }
    }

    fn board_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARD_FILE)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn load_document(&self) -> Result<BoardDocument> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Err(BoardError::BoardNotInitialized);
        }

        let contents = fs::read_to_string(&board_file).await?;
        let document: BoardDocument = serde_json::from_str(&contents)?;

        Ok(document)
    }

    async fn save_document(&self, document: &BoardDocument) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(document)?;
        let staging = self.board_file().with_extension("json.tmp");
        fs::write(&staging, json).await?;
        fs::rename(&staging, self.board_file()).await?;

        Ok(())
    }

    async fn mutate(&self, f: impl FnOnce(&mut BoardDocument) -> Result<()>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load_document().await?;
        f(&mut document)?;
        self.save_document(&document).await
    }
}

#[async_trait]
impl BoardStore for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let _guard = self.write_lock.lock().await;
        if !self.board_file().exists() {
            self.save_document(&BoardDocument::default()).await?;
            tracing::info!(path = %self.board_file().display(), "created board file");
        }

        let gitignore_path = self.root_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(gitignore_path, "*.tmp\n").await?;
        }

        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.board_file().exists()
    }

    async fn load_config(&self) -> Result<BoardConfig> {
        Ok(self.load_document().await?.config)
    }

    async fn save_config(&self, config: &BoardConfig) -> Result<()> {
        self.mutate(|doc| {
            doc.config = config.clone();
            Ok(())
        })
        .await
    }

    async fn list_all_lists(&self) -> Result<Vec<List>> {
        Ok(self.load_document().await?.lists)
    }

    async fn list_all_items(&self) -> Result<Vec<Item>> {
        Ok(self.load_document().await?.items)
    }

    async fn create_list(&self, list: &List) -> Result<()> {
        self.mutate(|doc| doc.insert_list(list)).await
    }

    async fn create_item(&self, item: &Item) -> Result<()> {
        self.mutate(|doc| doc.insert_item(item)).await
    }

    async fn update_list_position(&self, id: &ListId, position: i64) -> Result<()> {
        self.mutate(|doc| doc.update_list_position(id, position)).await
    }

    async fn rename_list(&self, id: &ListId, title: &str) -> Result<()> {
        self.mutate(|doc| doc.rename_list(id, title)).await
    }

    async fn update_item(&self, id: &ItemId, patch: &ItemPatch) -> Result<()> {
        self.mutate(|doc| doc.update_item(id, patch)).await
    }

    async fn delete_list(&self, id: &ListId) -> Result<()> {
        self.mutate(|doc| doc.remove_list(id)).await
    }

    async fn delete_item(&self, id: &ItemId) -> Result<()> {
        self.mutate(|doc| doc.remove_item(id)).await
    }
}
