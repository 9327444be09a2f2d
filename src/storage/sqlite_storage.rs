use crate::{
    config::BoardConfig,
    domain::{Item, ItemId, ItemPatch, List, ListId, Priority},
    error::{BoardError, Result},
    storage::BoardStore,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::{path::Path, str::FromStr};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS board_config (
    id   INTEGER PRIMARY KEY CHECK (id = 1),
    body TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS lists (
    id         TEXT PRIMARY KEY,
    title      TEXT NOT NULL,
    position   INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS items (
    id          TEXT PRIMARY KEY,
    list_id     TEXT NOT NULL,
    title       TEXT NOT NULL,
    description TEXT,
    due_date    TEXT,
    priority    TEXT,
    assigned_to TEXT,
    position    INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_items_list ON items (list_id, position);
";

const ITEM_COLUMNS: &str = "id, list_id, title, description, due_date, priority, assigned_to, position, created_at, updated_at";

/// SQLite-based storage backend for lists and items
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) a database file
    pub fn open(database_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open(database_path)?),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    async fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        let conn = self.conn.lock().await;
        if !tables_exist(&conn)? {
            return Err(BoardError::BoardNotInitialized);
        }
        Ok(conn)
    }
}

fn tables_exist(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('board_config', 'lists', 'items')",
        [],
        |row| row.get(0),
    )?;
    Ok(count == 3)
}

fn list_exists(conn: &Connection, id: &ListId) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM lists WHERE id = ?1",
            params![id.to_string()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|e| BoardError::Store(format!("bad timestamp '{}': {}", raw, e)))
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| BoardError::Store(format!("bad id '{}': {}", raw, e)))
}

/// Raw text columns of a `lists` row
struct ListRow {
    id: String,
    title: String,
    position: i64,
    created_at: String,
    updated_at: String,
}

impl ListRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            position: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn into_list(self) -> Result<List> {
        Ok(List {
            id: ListId::from(parse_uuid(&self.id)?),
            title: self.title,
            position: self.position,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Raw text columns of an `items` row
struct ItemRow {
    id: String,
    list_id: String,
    title: String,
    description: Option<String>,
    due_date: Option<String>,
    priority: Option<String>,
    assigned_to: Option<String>,
    position: i64,
    created_at: String,
    updated_at: String,
}

impl ItemRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            list_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            due_date: row.get(4)?,
            priority: row.get(5)?,
            assigned_to: row.get(6)?,
            position: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn into_item(self) -> Result<Item> {
        Ok(Item {
            id: ItemId::from(parse_uuid(&self.id)?),
            list_id: ListId::from(parse_uuid(&self.list_id)?),
            title: self.title,
            description: self.description,
            due_date: self.due_date.as_deref().map(parse_timestamp).transpose()?,
            priority: self.priority.as_deref().map(Priority::from_str).transpose()?,
            assigned_to: self.assigned_to,
            position: self.position,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn load_item(conn: &Connection, id: &ItemId) -> Result<Item> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM items WHERE id = ?1", ITEM_COLUMNS),
            params![id.to_string()],
            ItemRow::from_row,
        )
        .optional()?
        .ok_or_else(|| BoardError::ItemNotFound(id.to_string()))?;
    row.into_item()
}

#[async_trait]
impl BoardStore for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch(SCHEMA)?;
        let default_config = serde_json::to_string(&BoardConfig::default())?;
        conn.execute(
            "INSERT OR IGNORE INTO board_config (id, body) VALUES (1, ?1)",
            params![default_config],
        )?;
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        let conn = self.conn.lock().await;
        tables_exist(&conn).unwrap_or(false)
    }

    async fn load_config(&self) -> Result<BoardConfig> {
        let conn = self.connection().await?;
        let body: String =
            conn.query_row("SELECT body FROM board_config WHERE id = 1", [], |row| {
                row.get(0)
            })?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn save_config(&self, config: &BoardConfig) -> Result<()> {
        let conn = self.connection().await?;
        let body = serde_json::to_string(config)?;
        conn.execute(
            "INSERT INTO board_config (id, body) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET body = excluded.body",
            params![body],
        )?;
        Ok(())
    }

    async fn list_all_lists(&self) -> Result<Vec<List>> {
        let conn = self.connection().await?;
        let mut stmt =
            conn.prepare("SELECT id, title, position, created_at, updated_at FROM lists")?;
        let rows = stmt
            .query_map([], ListRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(ListRow::into_list).collect()
    }

    async fn list_all_items(&self) -> Result<Vec<Item>> {
        let conn = self.connection().await?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM items", ITEM_COLUMNS))?;
        let rows = stmt
            .query_map([], ItemRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(ItemRow::into_item).collect()
    }

    async fn create_list(&self, list: &List) -> Result<()> {
        let conn = self.connection().await?;
        if list_exists(&conn, &list.id)? {
            return Err(BoardError::Store(format!("list {} already exists", list.id)));
        }
        conn.execute(
            "INSERT INTO lists (id, title, position, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                list.id.to_string(),
                list.title,
                list.position,
                timestamp(&list.created_at),
                timestamp(&list.updated_at),
            ],
        )?;
        Ok(())
    }

    async fn create_item(&self, item: &Item) -> Result<()> {
        let conn = self.connection().await?;
        if !list_exists(&conn, &item.list_id)? {
            return Err(BoardError::ListNotFound(item.list_id.to_string()));
        }
        conn.execute(
            &format!(
                "INSERT INTO items ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                ITEM_COLUMNS
            ),
            params![
                item.id.to_string(),
                item.list_id.to_string(),
                item.title,
                item.description,
                item.due_date.as_ref().map(timestamp),
                item.priority.map(|p| p.to_string()),
                item.assigned_to,
                item.position,
                timestamp(&item.created_at),
                timestamp(&item.updated_at),
            ],
        )?;
        Ok(())
    }

    async fn update_list_position(&self, id: &ListId, position: i64) -> Result<()> {
        let conn = self.connection().await?;
        let changed = conn.execute(
            "UPDATE lists SET position = ?1, updated_at = ?2 WHERE id = ?3",
            params![position, timestamp(&Utc::now()), id.to_string()],
        )?;
        if changed == 0 {
            return Err(BoardError::ListNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn rename_list(&self, id: &ListId, title: &str) -> Result<()> {
        let conn = self.connection().await?;
        let changed = conn.execute(
            "UPDATE lists SET title = ?1, updated_at = ?2 WHERE id = ?3",
            params![title, timestamp(&Utc::now()), id.to_string()],
        )?;
        if changed == 0 {
            return Err(BoardError::ListNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn update_item(&self, id: &ItemId, patch: &ItemPatch) -> Result<()> {
        let conn = self.connection().await?;
        if let Some(list_id) = &patch.list_id {
            if !list_exists(&conn, list_id)? {
                return Err(BoardError::ListNotFound(list_id.to_string()));
            }
        }

        let mut item = load_item(&conn, id)?;
        item.apply_patch(patch);

        conn.execute(
            "UPDATE items SET list_id = ?1, title = ?2, description = ?3, due_date = ?4,
                 priority = ?5, assigned_to = ?6, position = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                item.list_id.to_string(),
                item.title,
                item.description,
                item.due_date.as_ref().map(timestamp),
                item.priority.map(|p| p.to_string()),
                item.assigned_to,
                item.position,
                timestamp(&item.updated_at),
                id.to_string(),
            ],
        )?;
        Ok(())
    }

    async fn delete_list(&self, id: &ListId) -> Result<()> {
        let conn = self.connection().await?;
        let changed = conn.execute("DELETE FROM lists WHERE id = ?1", params![id.to_string()])?;
        if changed == 0 {
            return Err(BoardError::ListNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_item(&self, id: &ItemId) -> Result<()> {
        let conn = self.connection().await?;
        let changed = conn.execute("DELETE FROM items WHERE id = ?1", params![id.to_string()])?;
        if changed == 0 {
            return Err(BoardError::ItemNotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn initialized() -> SqliteStorage {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.initialize().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_initialize() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert!(!storage.is_initialized().await);
        assert!(matches!(
            storage.list_all_lists().await,
            Err(BoardError::BoardNotInitialized)
        ));

        storage.initialize().await.unwrap();

        assert!(storage.is_initialized().await);
        assert_eq!(storage.load_config().await.unwrap(), BoardConfig::default());
    }

    #[tokio::test]
    async fn test_item_round_trip() {
        let storage = initialized().await;
        let list = List::new("Jobs".to_string(), 0);
        let mut item = Item::new(list.id, "Service boiler".to_string(), 0);
        item.description = Some("Annual check".to_string());
        item.due_date = Some(Utc::now());
        item.priority = Some(Priority::High);
        item.assigned_to = Some("tech@example.com".to_string());

        storage.create_list(&list).await.unwrap();
        storage.create_item(&item).await.unwrap();

        let snapshot = storage.load_snapshot().await.unwrap();
        assert_eq!(snapshot.lists, vec![list]);
        assert_eq!(snapshot.items, vec![item]);
    }

    #[tokio::test]
    async fn test_update_item_patch() {
        let storage = initialized().await;
        let first = List::new("A".to_string(), 0);
        let second = List::new("B".to_string(), 1);
        let item = Item::new(first.id, "Task".to_string(), 3);
        storage.create_list(&first).await.unwrap();
        storage.create_list(&second).await.unwrap();
        storage.create_item(&item).await.unwrap();

        storage
            .update_item(&item.id, &ItemPatch::relocate(second.id, 0))
            .await
            .unwrap();

        let stored = storage.list_all_items().await.unwrap();
        assert_eq!(stored[0].list_id, second.id);
        assert_eq!(stored[0].position, 0);
        assert_eq!(stored[0].title, "Task");

        let missing = storage
            .update_item(&item.id, &ItemPatch::relocate(ListId::new(), 0))
            .await;
        assert!(matches!(missing, Err(BoardError::ListNotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let storage = initialized().await;
        assert!(matches!(
            storage.update_list_position(&ListId::new(), 1).await,
            Err(BoardError::ListNotFound(_))
        ));
        assert!(matches!(
            storage.delete_item(&ItemId::new()).await,
            Err(BoardError::ItemNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("board.db");
        let list = List::new("Deliveries".to_string(), 0);
        {
            let storage = SqliteStorage::open(&path).unwrap();
            storage.initialize().await.unwrap();
            storage.create_list(&list).await.unwrap();
        }

        let reopened = SqliteStorage::open(&path).unwrap();
        assert!(reopened.is_initialized().await);
        assert_eq!(reopened.list_all_lists().await.unwrap(), vec![list]);
    }
}
