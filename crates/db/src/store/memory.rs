//! Process-local [`EntityStore`] backed by an ordered map.
//!
//! A transaction holds the table's write lock for its whole lifetime and
//! mutates a private copy; `commit` swaps the copy in. Readers therefore never
//! observe a half-applied batch, and an abandoned transaction leaves the table
//! untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use villa_core::types::DbId;

use super::{Entity, EntityStore, Filter, StoreError, StoreTransaction};

#[derive(Debug, Clone)]
struct Table<T> {
    rows: BTreeMap<DbId, T>,
    next_id: DbId,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Entity> Table<T> {
    /// Keep the identity counter ahead of every generated id. Natural keys
    /// never touch it.
    fn advance_counter(&mut self, id: DbId) {
        if T::GENERATED_ID {
            self.next_id = self.next_id.max(id.saturating_add(1));
        }
    }

    /// Reject `entity` if any of its unique keys is held by another row.
    fn check_unique(&self, entity: &T) -> Result<(), StoreError> {
        let keys = entity.unique_keys();
        if keys.is_empty() {
            return Ok(());
        }
        for (id, row) in &self.rows {
            if *id == entity.id() {
                continue;
            }
            for (constraint, key) in row.unique_keys() {
                if keys.iter().any(|(c, k)| *c == constraint && *k == key) {
                    return Err(StoreError::UniqueViolation(constraint.to_string()));
                }
            }
        }
        Ok(())
    }
}

/// In-memory store for one entity type. Cloning shares the same table.
pub struct MemoryStore<T> {
    table: Arc<RwLock<Table<T>>>,
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table::default())),
        }
    }

    /// Build a store pre-populated with `rows`.
    ///
    /// Generated identities are honoured when non-zero; zero identities are
    /// assigned from the counter. Rows violating a unique key are rejected.
    pub fn seeded(rows: impl IntoIterator<Item = T>) -> Result<Self, StoreError> {
        let mut table = Table::default();
        for mut row in rows {
            if row.id() == 0 {
                if !T::GENERATED_ID {
                    return Err(StoreError::MissingIdentity { entity: T::NAME });
                }
                row.set_id(table.next_id);
            }
            if table.rows.contains_key(&row.id()) {
                return Err(StoreError::UniqueViolation(format!("{}_pkey", T::TABLE)));
            }
            table.check_unique(&row)?;
            table.advance_counter(row.id());
            table.rows.insert(row.id(), row);
        }
        Ok(Self {
            table: Arc::new(RwLock::new(table)),
        })
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for MemoryStore<T> {
    async fn query(&self, filter: &Filter<T>) -> Result<Vec<T>, StoreError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction<T>>, StoreError> {
        let guard = Arc::clone(&self.table).write_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

struct MemoryTransaction<T> {
    guard: OwnedRwLockWriteGuard<Table<T>>,
    working: Table<T>,
}

#[async_trait]
impl<T: Entity> StoreTransaction<T> for MemoryTransaction<T> {
    async fn insert(&mut self, entity: &T) -> Result<DbId, StoreError> {
        let mut row = entity.clone();
        if T::GENERATED_ID {
            row.set_id(self.working.next_id);
        } else if row.id() == 0 {
            return Err(StoreError::MissingIdentity { entity: T::NAME });
        }

        if self.working.rows.contains_key(&row.id()) {
            return Err(StoreError::UniqueViolation(format!("{}_pkey", T::TABLE)));
        }
        self.working.check_unique(&row)?;

        let id = row.id();
        self.working.advance_counter(id);
        self.working.rows.insert(id, row);
        Ok(id)
    }

    async fn update(&mut self, entity: &T) -> Result<(), StoreError> {
        let id = entity.id();
        if !self.working.rows.contains_key(&id) {
            return Err(StoreError::RowNotFound {
                entity: T::NAME,
                id,
            });
        }
        self.working.check_unique(entity)?;
        self.working.rows.insert(id, entity.clone());
        Ok(())
    }

    async fn delete(&mut self, entity: &T) -> Result<(), StoreError> {
        let id = entity.id();
        self.working
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::RowNotFound {
                entity: T::NAME,
                id,
            })
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::store::FieldValue;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: DbId,
        label: String,
    }

    impl Entity for Tag {
        const NAME: &'static str = "Tag";
        const TABLE: &'static str = "tags";
        const ID_COLUMN: &'static str = "id";

        fn id(&self) -> DbId {
            self.id
        }

        fn set_id(&mut self, id: DbId) {
            self.id = id;
        }

        fn field(&self, column: &str) -> Option<FieldValue> {
            match column {
                "id" => Some(self.id.into()),
                "label" => Some(self.label.clone().into()),
                _ => None,
            }
        }

        fn unique_keys(&self) -> Vec<(&'static str, String)> {
            vec![("uq_tags_label", self.label.to_lowercase())]
        }
    }

    fn tag(label: &str) -> Tag {
        Tag {
            id: 0,
            label: label.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MemoryStore::<Tag>::new();
        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.insert(&tag("a")).await.unwrap(), 1);
        assert_eq!(tx.insert(&tag("b")).await.unwrap(), 2);
        tx.commit().await.unwrap();

        let rows = store.query(&Filter::All).await.unwrap();
        assert_eq!(rows.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_changes() {
        let store = MemoryStore::<Tag>::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert(&tag("ghost")).await.unwrap();
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_unique_key_violation() {
        let store = MemoryStore::seeded(vec![tag("Pool")]).unwrap();
        let mut tx = store.begin().await.unwrap();
        let err = tx.insert(&tag("POOL")).await.unwrap_err();
        assert_matches!(err, StoreError::UniqueViolation(c) if c == "uq_tags_label");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_row() {
        let store = MemoryStore::<Tag>::new();
        let mut tx = store.begin().await.unwrap();
        let missing = Tag {
            id: 9,
            label: "x".into(),
        };
        assert_matches!(
            tx.update(&missing).await,
            Err(StoreError::RowNotFound { id: 9, .. })
        );
        assert_matches!(
            tx.delete(&missing).await,
            Err(StoreError::RowNotFound { id: 9, .. })
        );
    }

    #[tokio::test]
    async fn test_seeded_rows_advance_counter() {
        let store = MemoryStore::seeded(vec![
            Tag {
                id: 5,
                label: "five".into(),
            },
            tag("next"),
        ])
        .unwrap();
        let ids: Vec<_> = store
            .query(&Filter::All)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![5, 6]);
    }

    #[tokio::test]
    async fn test_largest_generated_id_does_not_overflow_counter() {
        let store = MemoryStore::seeded(vec![Tag {
            id: DbId::MAX,
            label: "last".into(),
        }])
        .unwrap();
        assert_eq!(store.len().await, 1);
    }
}
