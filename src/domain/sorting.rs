use crate::domain::item::{Item, Priority};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Position,
    Title,
    Due,
    Priority,
    Created,
    Updated,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "position" => Ok(SortField::Position),
            "title" => Ok(SortField::Title),
            "due" => Ok(SortField::Due),
            "priority" => Ok(SortField::Priority),
            "created" => Ok(SortField::Created),
            "updated" => Ok(SortField::Updated),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: position, title, due, priority, created, updated",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts items in place for display.
///
/// Sorting is a view concern only; it never changes stored positions.
///
/// # Examples
/// ```
/// use taskboard_core::domain::sorting::{sort_items, SortField, SortOrder};
/// use taskboard_core::domain::{Item, ListId};
///
/// let list = ListId::new();
/// let mut items = vec![
///     Item::new(list, "Charlie".to_string(), 0),
///     Item::new(list, "alpha".to_string(), 1),
/// ];
///
/// sort_items(&mut items, SortField::Title, SortOrder::Ascending);
/// assert_eq!(items[0].title, "alpha");
/// ```
pub fn sort_items(items: &mut [Item], field: SortField, order: SortOrder) {
    items.sort_by(|a, b| {
        let cmp = match field {
            SortField::Position => a.position.cmp(&b.position),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Due => return compare_option_dates(a.due_date, b.due_date, order),
            SortField::Priority => compare_priority(a.priority, b.priority),
            SortField::Created => a.created_at.cmp(&b.created_at),
            SortField::Updated => a.updated_at.cmp(&b.updated_at),
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Items without a priority rank below `Low`
fn compare_priority(a: Option<Priority>, b: Option<Priority>) -> Ordering {
    a.cmp(&b)
}

/// Dated items come first in either direction; undated ones trail
fn compare_option_dates(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    order: SortOrder,
) -> Ordering {
    match (a, b) {
        (Some(a_date), Some(b_date)) => match order {
            SortOrder::Ascending => a_date.cmp(&b_date),
            SortOrder::Descending => b_date.cmp(&a_date),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::list::ListId;

    fn items(titles: &[&str]) -> Vec<Item> {
        let list = ListId::new();
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| Item::new(list, t.to_string(), i as i64))
            .collect()
    }

    #[test]
    fn test_parse_fields_and_orders() {
        assert_eq!(SortField::from_str("DUE").unwrap(), SortField::Due);
        assert_eq!(SortOrder::from_str("desc").unwrap(), SortOrder::Descending);
        assert!(SortField::from_str("colour").is_err());
        assert!(SortOrder::from_str("up").is_err());
    }

    #[test]
    fn test_sort_by_title_case_insensitive() {
        let mut items = items(&["zebra", "Apple", "BANANA"]);
        sort_items(&mut items, SortField::Title, SortOrder::Ascending);

        assert_eq!(items[0].title, "Apple");
        assert_eq!(items[1].title, "BANANA");
        assert_eq!(items[2].title, "zebra");
    }

    #[test]
    fn test_sort_by_position_descending() {
        let mut items = items(&["a", "b", "c"]);
        sort_items(&mut items, SortField::Position, SortOrder::Descending);

        assert_eq!(items[0].title, "c");
        assert_eq!(items[2].title, "a");
    }

    #[test]
    fn test_sort_by_priority() {
        let mut items = items(&["none", "high", "low"]);
        items[1].priority = Some(Priority::High);
        items[2].priority = Some(Priority::Low);

        sort_items(&mut items, SortField::Priority, SortOrder::Descending);

        assert_eq!(items[0].title, "high");
        assert_eq!(items[1].title, "low");
        assert_eq!(items[2].title, "none");
    }

    #[test]
    fn test_undated_items_trail_in_both_directions() {
        let now = Utc::now();
        let mut list = items(&["undated", "later", "sooner"]);
        list[1].due_date = Some(now + chrono::Duration::days(5));
        list[2].due_date = Some(now);

        sort_items(&mut list, SortField::Due, SortOrder::Ascending);
        assert_eq!(list[0].title, "sooner");
        assert_eq!(list[2].title, "undated");

        sort_items(&mut list, SortField::Due, SortOrder::Descending);
        assert_eq!(list[0].title, "later");
        assert_eq!(list[2].title, "undated");
    }
}
