use crate::domain::list::ListId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Unique identifier for a to-do item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ItemId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for ItemId {
    type Err = crate::error::BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| crate::error::BoardError::ItemNotFound(s.to_string()))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Urgency of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = crate::error::BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(crate::error::BoardError::invalid(
                "priority",
                format!("'{}' is not one of low, medium, high", other),
            )),
        }
    }
}

/// A single to-do task owned by exactly one list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub list_id: ListId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Creates a new item in `list_id` at the given position
    pub fn new(list_id: ListId, title: String, position: i64) -> Self {
        let now = Utc::now();
        Self {
            id: ItemId::new(),
            list_id,
            title,
            description: None,
            due_date: None,
            priority: None,
            assigned_to: None,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies every field present in `patch`
    pub fn apply_patch(&mut self, patch: &ItemPatch) {
        if let Some(list_id) = patch.list_id {
            self.list_id = list_id;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assigned_to) = &patch.assigned_to {
            self.assigned_to = assigned_to.clone();
        }
        self.updated_at = Utc::now();
    }

    /// Whether the item was due strictly before `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date.map(|due| due < now).unwrap_or(false)
    }
}

/// Partial update of an item.
///
/// Outer `None` leaves a field untouched; for nullable fields `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<ListId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Option<Priority>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<String>>,
}

impl ItemPatch {
    pub fn position(position: i64) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn relocate(list_id: ListId, position: i64) -> Self {
        Self {
            list_id: Some(list_id),
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parsing() {
        assert_eq!(Priority::from_str("HIGH").unwrap(), Priority::High);
        assert_eq!(Priority::from_str(" low ").unwrap(), Priority::Low);
        assert!(Priority::from_str("urgent").is_err());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
    }

    #[test]
    fn test_apply_patch_relocates() {
        let source = ListId::new();
        let target = ListId::new();
        let mut item = Item::new(source, "Call supplier".to_string(), 3);

        item.apply_patch(&ItemPatch::relocate(target, 0));

        assert_eq!(item.list_id, target);
        assert_eq!(item.position, 0);
        assert_eq!(item.title, "Call supplier");
    }

    #[test]
    fn test_apply_patch_clears_nullable_fields() {
        let mut item = Item::new(ListId::new(), "Inspect van".to_string(), 0);
        item.priority = Some(Priority::High);
        item.assigned_to = Some("ops@example.com".to_string());

        item.apply_patch(&ItemPatch {
            priority: Some(None),
            ..ItemPatch::default()
        });

        assert_eq!(item.priority, None);
        assert_eq!(item.assigned_to.as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn test_is_overdue() {
        let now = Utc::now();
        let mut item = Item::new(ListId::new(), "Invoice".to_string(), 0);
        assert!(!item.is_overdue(now));

        item.due_date = Some(now - chrono::Duration::hours(1));
        assert!(item.is_overdue(now));

        item.due_date = Some(now + chrono::Duration::hours(1));
        assert!(!item.is_overdue(now));
    }

    #[test]
    fn test_empty_patch() {
        assert!(ItemPatch::default().is_empty());
        assert!(!ItemPatch::position(1).is_empty());
    }

    #[test]
    fn test_serialization_skips_missing_optionals() {
        let item = Item::new(ListId::new(), "Test".to_string(), 0);
        let json = serde_json::to_string(&item).unwrap();

        assert!(!json.contains("due_date"));
        assert!(!json.contains("priority"));

        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
