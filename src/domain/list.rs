use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Unique identifier for a board list (column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(Uuid);

impl ListId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ListId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ListId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for ListId {
    type Err = crate::error::BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| crate::error::BoardError::ListNotFound(s.to_string()))
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, ordered column of items on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub title: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl List {
    /// Creates a new list at the given position
    pub fn new(title: String, position: i64) -> Self {
        let now = Utc::now();
        Self {
            id: ListId::new(),
            title,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    pub fn set_position(&mut self, position: i64) {
        self.position = position;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_id_round_trips_through_display() {
        let id = ListId::new();
        let parsed = ListId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_list_id_rejects_garbage() {
        assert!(ListId::from_str("not-a-uuid").is_err());
        assert!(ListId::from_str("").is_err());
    }

    #[test]
    fn test_set_title_updates_updated_at() {
        let mut list = List::new("To Do".to_string(), 0);
        let initial_updated_at = list.updated_at;

        std::thread::sleep(std::time::Duration::from_millis(10));
        list.set_title("Backlog".to_string());

        assert_eq!(list.title, "Backlog");
        assert!(list.updated_at > initial_updated_at);
    }

    #[test]
    fn test_list_serializes_id_as_string() {
        let list = List::new("Done".to_string(), 2);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["id"], list.id.to_string());
        assert_eq!(json["position"], 2);
    }
}
