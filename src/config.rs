use serde::{Deserialize, Serialize};

/// What happens to sibling positions when a list or item is deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Remaining siblings are repacked to `0..n-1` right away
    #[default]
    Repack,
    /// Gaps stay until the next drop touches the sequence
    LeaveGaps,
}

/// Board configuration, persisted alongside the board data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    /// Lists created when an empty board is initialized
    #[serde(default)]
    pub default_lists: Vec<String>,
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

impl BoardConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_lists: Vec::new(),
            delete_policy: DeletePolicy::default(),
        }
    }

    pub fn with_default_lists<I, T>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.default_lists = titles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new("To-Do Board").with_default_lists(["To Do", "In Progress", "Done"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BoardConfig::default();
        assert_eq!(config.default_lists, vec!["To Do", "In Progress", "Done"]);
        assert_eq!(config.delete_policy, DeletePolicy::Repack);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: BoardConfig = serde_json::from_str(r#"{ "name": "Office" }"#).unwrap();
        assert_eq!(config.name, "Office");
        assert!(config.default_lists.is_empty());
        assert_eq!(config.delete_policy, DeletePolicy::Repack);
    }

    #[test]
    fn test_delete_policy_serialization() {
        let json = serde_json::to_string(&DeletePolicy::LeaveGaps).unwrap();
        assert_eq!(json, "\"leave_gaps\"");
    }
}
