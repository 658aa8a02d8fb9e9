//! Generic unit-of-work repository.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use villa_core::types::{DbId, Timestamp};

use crate::store::{Entity, EntityStore, Filter, StoreError};

/// Entities carrying a last-updated stamp written by specialized `update`s.
pub trait Timestamped {
    fn updated_date(&self) -> Option<Timestamp>;

    fn set_updated_date(&mut self, at: Timestamp);

    /// Stamp `updated_date` with `now`, never moving it backwards even if
    /// the wall clock does.
    fn touch(&mut self, now: Timestamp) {
        let stamp = match self.updated_date() {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        self.set_updated_date(stamp);
    }
}

/// Identity-map entry: the row as loaded and the caller's working copy.
struct TrackedEntry<T> {
    original: T,
    current: T,
}

enum Change<T> {
    Insert(T),
    Update(T),
    Delete(T),
}

/// Rows written by a successful [`Repository::commit`], in staging order.
#[derive(Debug)]
pub struct Committed<T> {
    /// Inserted rows with their store-assigned identities.
    pub inserted: Vec<T>,
    pub updated: Vec<T>,
    pub removed: Vec<DbId>,
}

impl<T> Default for Committed<T> {
    fn default() -> Self {
        Self {
            inserted: Vec::new(),
            updated: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<T> Committed<T> {
    /// Total number of rows written.
    pub fn len(&self) -> usize {
        self.inserted.len() + self.updated.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A unit of work over one [`EntityStore`].
///
/// Reads are either tracked or detached:
///
/// - A tracked read records the row in the identity map. Changes made through
///   [`Repository::tracked_mut`] are detected and written by the next commit.
/// - A detached read returns a snapshot nothing else knows about; mutating it
///   has no effect unless the caller stages an explicit write.
///
/// Writes are staged by [`Repository::create`], [`Repository::remove`] and
/// the specialized `update` of each entity repository, and reach the store
/// only on [`Repository::commit`].
///
/// One repository serves one request and must not be shared between
/// concurrent tasks; the underlying store handle may be.
pub struct Repository<T: Entity> {
    store: Arc<dyn EntityStore<T>>,
    tracked: HashMap<DbId, TrackedEntry<T>>,
    staged: Vec<Change<T>>,
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn EntityStore<T>>) -> Self {
        Self {
            store,
            tracked: HashMap::new(),
            staged: Vec::new(),
        }
    }

    /// All rows matching `filter` (every row when `None`). No ordering guarantee.
    pub async fn get_all(&self, filter: Option<&Filter<T>>) -> Result<Vec<T>, StoreError> {
        match filter {
            Some(filter) => self.store.query(filter).await,
            None => self.store.query(&Filter::All).await,
        }
    }

    /// The first row matching `filter`, or `None`.
    ///
    /// With `tracked`, the row joins the identity map; if its identity is
    /// already tracked the existing working copy is returned instead.
    pub async fn get(&mut self, filter: &Filter<T>, tracked: bool) -> Result<Option<T>, StoreError> {
        let Some(found) = self.store.query(filter).await?.into_iter().next() else {
            return Ok(None);
        };
        if !tracked {
            return Ok(Some(found));
        }

        let entry = self
            .tracked
            .entry(found.id())
            .or_insert_with(|| TrackedEntry {
                original: found.clone(),
                current: found,
            });
        Ok(Some(entry.current.clone()))
    }

    /// Mutable access to a tracked entity's working copy.
    ///
    /// Modifications are written by the next commit, which runs
    /// [`Entity::on_update`] on the modified copy first.
    pub fn tracked_mut(&mut self, id: DbId) -> Option<&mut T> {
        self.tracked.get_mut(&id).map(|entry| &mut entry.current)
    }

    pub fn is_tracked(&self, id: DbId) -> bool {
        self.tracked.contains_key(&id)
    }

    /// Stage `entity` for insertion. Generated identities are assigned at commit.
    pub fn create(&mut self, mut entity: T) {
        entity.on_create(Utc::now());
        self.staged.push(Change::Insert(entity));
    }

    /// Stage `entity` for deletion and stop tracking its identity.
    pub fn remove(&mut self, entity: T) {
        self.tracked.remove(&entity.id());
        self.staged.push(Change::Delete(entity));
    }

    /// Stage a full-row update. The explicit write supersedes any tracked copy.
    pub(crate) fn stage_update(&mut self, entity: T) {
        self.tracked.remove(&entity.id());
        self.staged.push(Change::Update(entity));
    }

    /// `true` when a commit would write something.
    pub fn has_changes(&self) -> bool {
        !self.staged.is_empty() || self.tracked.values().any(|e| e.current != e.original)
    }

    /// Apply every staged change and every modified tracked entity in one
    /// store transaction.
    ///
    /// All-or-nothing: on error the store is left as it was. Either way the
    /// staged batch is consumed and tracked copies are reset; no retry is
    /// attempted.
    pub async fn commit(&mut self) -> Result<Committed<T>, StoreError> {
        let mut changes = std::mem::take(&mut self.staged);
        let now = Utc::now();
        for entry in self.tracked.values() {
            if entry.current != entry.original {
                let mut modified = entry.current.clone();
                modified.on_update(now);
                changes.push(Change::Update(modified));
            }
        }
        if changes.is_empty() {
            return Ok(Committed::default());
        }

        match self.apply(changes).await {
            Ok(committed) => {
                for row in committed.inserted.iter().chain(&committed.updated) {
                    self.tracked.insert(
                        row.id(),
                        TrackedEntry {
                            original: row.clone(),
                            current: row.clone(),
                        },
                    );
                }
                tracing::debug!(
                    entity = T::NAME,
                    inserted = committed.inserted.len(),
                    updated = committed.updated.len(),
                    removed = committed.removed.len(),
                    "Committed changes"
                );
                Ok(committed)
            }
            Err(err) => {
                for entry in self.tracked.values_mut() {
                    entry.current = entry.original.clone();
                }
                tracing::warn!(entity = T::NAME, error = %err, "Commit rejected, changes discarded");
                Err(err)
            }
        }
    }

    async fn apply(&self, changes: Vec<Change<T>>) -> Result<Committed<T>, StoreError> {
        let mut tx = self.store.begin().await?;
        let mut committed = Committed::default();
        for change in changes {
            match change {
                Change::Insert(mut entity) => {
                    let id = tx.insert(&entity).await?;
                    entity.set_id(id);
                    committed.inserted.push(entity);
                }
                Change::Update(entity) => {
                    tx.update(&entity).await?;
                    committed.updated.push(entity);
                }
                Change::Delete(entity) => {
                    tx.delete(&entity).await?;
                    committed.removed.push(entity.id());
                }
            }
        }
        tx.commit().await?;
        Ok(committed)
    }
}

impl<T: Entity + Timestamped> Repository<T> {
    /// Stamp `updated_date`, stage the row as an update and commit.
    pub(crate) async fn stamp_and_update(&mut self, mut entity: T) -> Result<T, StoreError> {
        entity.touch(Utc::now());

        self.stage_update(entity.clone());
        self.commit().await?;
        Ok(entity)
    }
}
