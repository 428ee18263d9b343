//! The collection store the engine writes records to.
//!
//! The engine never talks to a database directly: every read and write goes
//! through [`Persistence`], so the same workflow runs against SQLite in
//! production and against [`MemoryPersistence`] in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{Collection, PersistenceError, Query, Row};

pub use database::DatabasePersistence;
pub use memory::MemoryPersistence;

mod database;
mod entities;
mod memory;

pub(crate) type ResultPersistence<T> = Result<T, PersistenceError>;

/// A queryable store keyed by collection.
///
/// Implementations assign `id` and `created_at` on insert; rows handed to
/// [`insert`](Persistence::insert) and [`update`](Persistence::update) carry
/// only the editable columns.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Returns the rows of `collection` matching `query`, in query order.
    ///
    /// A filter or ordering column the collection does not have fails with
    /// [`PersistenceError::UnknownColumn`].
    async fn select(&self, collection: Collection, query: &Query) -> ResultPersistence<Vec<Row>>;

    async fn find(&self, collection: Collection, id: Uuid) -> ResultPersistence<Option<Row>>;

    async fn count(&self, collection: Collection) -> ResultPersistence<u64>;

    /// Stores a new row and returns it as persisted.
    async fn insert(&self, collection: Collection, row: Row) -> ResultPersistence<Row>;

    /// Overwrites the columns present in `row` and returns the updated row.
    ///
    /// Fails with [`PersistenceError::NotFound`] when `id` does not exist.
    async fn update(&self, collection: Collection, id: Uuid, row: Row) -> ResultPersistence<Row>;

    /// Fails with [`PersistenceError::NotFound`] when `id` does not exist.
    async fn delete(&self, collection: Collection, id: Uuid) -> ResultPersistence<()>;
}
