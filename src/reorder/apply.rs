use crate::error::{BoardError, Result};
use crate::reorder::StoreWrite;
use crate::storage::BoardStore;

/// Runs planned writes against the store in order.
///
/// No retries. A failure on the first write is returned as-is since nothing
/// landed; a failure after that is wrapped in `PartialFailure` so the caller
/// knows to reload before trusting its view.
pub async fn apply_writes<S>(store: &S, writes: &[StoreWrite]) -> Result<()>
where
    S: BoardStore + ?Sized,
{
    let total = writes.len();

    for (applied, write) in writes.iter().enumerate() {
        let result = match write {
            StoreWrite::ListPosition { id, position } => {
                store.update_list_position(id, *position).await
            }
            StoreWrite::Item { id, patch } => store.update_item(id, patch).await,
        };

        if let Err(err) = result {
            if applied == 0 {
                tracing::warn!(total, error = %err, "first board write failed, nothing applied");
                return Err(err);
            }
            tracing::warn!(applied, total, error = %err, "board left partially updated");
            return Err(BoardError::PartialFailure {
                applied,
                total,
                source: Box::new(err),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Item, ItemId, ItemPatch, List, ListId};
    use crate::storage::{memory_storage::MemoryStorage, BoardStore};

    async fn seeded() -> (MemoryStorage, List, Vec<Item>) {
        let store = MemoryStorage::new();
        store.initialize().await.unwrap();
        let list = List::new("Todo".to_string(), 0);
        store.create_list(&list).await.unwrap();
        let mut items = Vec::new();
        for (position, title) in ["a", "b"].iter().enumerate() {
            let item = Item::new(list.id, title.to_string(), position as i64);
            store.create_item(&item).await.unwrap();
            items.push(item);
        }
        (store, list, items)
    }

    #[tokio::test]
    async fn test_apply_all_writes() {
        let (store, _, items) = seeded().await;
        let writes = vec![
            StoreWrite::Item {
                id: items[0].id,
                patch: ItemPatch::position(1),
            },
            StoreWrite::Item {
                id: items[1].id,
                patch: ItemPatch::position(0),
            },
        ];

        apply_writes(&store, &writes).await.unwrap();

        let stored = store.list_all_items().await.unwrap();
        let a = stored.iter().find(|i| i.id == items[0].id).unwrap();
        assert_eq!(a.position, 1);
    }

    #[tokio::test]
    async fn test_first_write_failure_is_not_partial() {
        let (store, _, _) = seeded().await;
        let writes = vec![StoreWrite::ListPosition {
            id: ListId::new(),
            position: 0,
        }];

        let err = apply_writes(&store, &writes).await.unwrap_err();
        assert!(matches!(err, BoardError::ListNotFound(_)));
    }

    #[tokio::test]
    async fn test_later_failure_is_partial() {
        let (store, list, items) = seeded().await;
        let writes = vec![
            StoreWrite::ListPosition {
                id: list.id,
                position: 0,
            },
            StoreWrite::Item {
                id: items[0].id,
                patch: ItemPatch::position(0),
            },
            StoreWrite::Item {
                id: ItemId::new(),
                patch: ItemPatch::position(1),
            },
        ];

        let err = apply_writes(&store, &writes).await.unwrap_err();
        match err {
            BoardError::PartialFailure {
                applied,
                total,
                source,
            } => {
                assert_eq!(applied, 2);
                assert_eq!(total, 3);
                assert!(matches!(*source, BoardError::ItemNotFound(_)));
            }
            other => panic!("expected partial failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_plan_is_ok() {
        let (store, _, _) = seeded().await;
        apply_writes(&store, &[]).await.unwrap();
    }
}
