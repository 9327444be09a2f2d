use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// A drag id that matches neither a list nor an item in the snapshot
    #[error("No list or item with id {0}")]
    NotFound(String),

    #[error("Board not initialized")]
    BoardNotInitialized,

    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Storage error: {0}")]
    Store(String),

    /// Some writes of a multi-write plan landed before a later one failed
    #[error("Applied {applied} of {total} writes before failing: {source}")]
    PartialFailure {
        applied: usize,
        total: usize,
        #[source]
        source: Box<BoardError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "sqlite-storage")]
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BoardError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Whether the caller should drop its cached view and reload the board
    /// from the store before letting the user retry.
    pub fn requires_reload(&self) -> bool {
        !matches!(
            self,
            Self::InvalidInput { .. } | Self::BoardNotInitialized
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_failure_message() {
        let err = BoardError::PartialFailure {
            applied: 2,
            total: 5,
            source: Box::new(BoardError::Store("timeout".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "Applied 2 of 5 writes before failing: Storage error: timeout"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_requires_reload() {
        assert!(BoardError::NotFound("x".to_string()).requires_reload());
        assert!(BoardError::Store("down".to_string()).requires_reload());
        assert!(!BoardError::invalid("title", "must not be empty").requires_reload());
    }
}
