//! Field validation shared by lists and items.

use crate::error::{BoardError, Result};
use regex::Regex;
use std::sync::OnceLock;

pub const MAX_TITLE_LEN: usize = 200;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// Trims a title and rejects empty or oversized values
pub fn title(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BoardError::invalid("title", "must not be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(BoardError::invalid(
            "title",
            format!("must be at most {} characters", MAX_TITLE_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

/// Normalizes an assignee email; blank input means unassigned
pub fn assignee(raw: &str) -> Result<Option<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if !email_regex().is_match(trimmed) {
        return Err(BoardError::invalid(
            "assigned_to",
            format!("'{}' is not an email address", trimmed),
        ));
    }
    Ok(Some(trimmed.to_lowercase()))
}

/// Drops descriptions that are only whitespace
pub fn description(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_is_trimmed() {
        assert_eq!(title("  Ship it ").unwrap(), "Ship it");
    }

    #[test]
    fn test_blank_title_rejected() {
        let err = title("   ").unwrap_err();
        assert!(matches!(err, BoardError::InvalidInput { ref field, .. } if field == "title"));
    }

    #[test]
    fn test_long_title_rejected() {
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(title(&long).is_err());
        assert!(title(&"x".repeat(MAX_TITLE_LEN)).is_ok());
    }

    #[test]
    fn test_assignee_email() {
        assert_eq!(
            assignee("Ops@Example.com").unwrap(),
            Some("ops@example.com".to_string())
        );
        assert_eq!(assignee("").unwrap(), None);
        assert!(assignee("not an email").is_err());
        assert!(assignee("missing@tld").is_err());
    }

    #[test]
    fn test_description_blank_is_none() {
        assert_eq!(description(" \n "), None);
        assert_eq!(description(" notes "), Some("notes".to_string()));
    }
}
