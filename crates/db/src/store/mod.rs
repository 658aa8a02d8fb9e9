//! Entity store contract.
//!
//! An [`EntityStore`] owns the durable rows of one entity type. Reads go
//! through [`EntityStore::query`]; every write happens inside a
//! [`StoreTransaction`] that publishes nothing until [`StoreTransaction::commit`].
//!
//! Two interchangeable backends implement the contract:
//!
//! - [`memory::MemoryStore`] -- process-local ordered map (dev, tests).
//! - [`postgres::PgStore`] -- PostgreSQL via sqlx.

use async_trait::async_trait;
use villa_core::types::{DbId, Timestamp};

pub mod filter;
pub mod memory;
pub mod postgres;

pub use filter::{FieldValue, Filter};
pub use memory::MemoryStore;
pub use postgres::{PgEntity, PgStore};

/// A persisted record type with an integer identity.
pub trait Entity: Clone + PartialEq + Send + Sync + 'static {
    /// Human-readable entity name used in errors and logs.
    const NAME: &'static str;
    /// Backing table name.
    const TABLE: &'static str;
    /// Column holding the identity.
    const ID_COLUMN: &'static str;
    /// `true` when the store assigns the identity on insert. Natural keys
    /// (supplied by the caller) set this to `false`.
    const GENERATED_ID: bool = true;

    fn id(&self) -> DbId;

    fn set_id(&mut self, id: DbId);

    /// Column value used when a [`Filter`] is evaluated in memory.
    ///
    /// Returns `None` for unknown columns, which never match.
    fn field(&self, column: &str) -> Option<FieldValue>;

    /// `(constraint, normalized key)` pairs that must be unique per table.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Invoked once when the entity is staged for insertion.
    fn on_create(&mut self, _now: Timestamp) {}

    /// Invoked on every write of an existing row, whether staged explicitly
    /// or detected on a tracked copy at commit.
    fn on_update(&mut self, _now: Timestamp) {}
}

/// Errors raised by entity store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique key or primary key is already taken.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// An update or delete targeted an identity that is not stored.
    #[error("{entity} with id {id} does not exist")]
    RowNotFound { entity: &'static str, id: DbId },

    /// A natural-key entity was inserted without an identity.
    #[error("{entity} requires a caller-supplied identity")]
    MissingIdentity { entity: &'static str },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Shared, queryable store for one entity type.
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    /// All rows matching `filter`, in store-native order.
    async fn query(&self, filter: &Filter<T>) -> Result<Vec<T>, StoreError>;

    /// Open a write transaction.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction<T>>, StoreError>;
}

/// A write batch. Dropping it without calling `commit` discards every change.
#[async_trait]
pub trait StoreTransaction<T: Entity>: Send {
    /// Insert `entity`, returning its identity (store-assigned for generated keys).
    async fn insert(&mut self, entity: &T) -> Result<DbId, StoreError>;

    async fn update(&mut self, entity: &T) -> Result<(), StoreError>;

    async fn delete(&mut self, entity: &T) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
