use std::{
    cmp,
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering as AtomicOrdering},
};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    Collection, Direction, PersistenceError, Query, Row,
    collection::column_text,
};

use super::{Persistence, ResultPersistence};

/// In-process [`Persistence`] keeping rows in insertion order.
///
/// Ordering follows SQLite: `NULL` sorts before any value. Columns are
/// checked against [`Collection::columns`], so an unknown column fails the
/// same way it does on the database backend. Writes can be made to fail on
/// demand.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    rows: RwLock<HashMap<Collection, Vec<Row>>>,
    fail_writes: AtomicBool,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `insert`, `update` and `delete` fail while `fail` is set.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, AtomicOrdering::SeqCst);
    }

    fn check_writable(&self) -> ResultPersistence<()> {
        if self.fail_writes.load(AtomicOrdering::SeqCst) {
            return Err(PersistenceError::Unavailable(
                "writes are disabled".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_columns(collection: Collection, query: &Query) -> ResultPersistence<()> {
    let columns = query
        .filters
        .iter()
        .map(|(column, _)| column)
        .chain(query.ordering.as_ref().map(|ordering| &ordering.column));
    for column in columns {
        if !collection.has_column(column) {
            return Err(PersistenceError::UnknownColumn(column.clone()));
        }
    }
    Ok(())
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> cmp::Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => cmp::Ordering::Equal,
        (None | Some(Value::Null), _) => cmp::Ordering::Less,
        (_, None | Some(Value::Null)) => cmp::Ordering::Greater,
        (Some(Value::Number(a)), Some(Value::Number(b))) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(cmp::Ordering::Equal),
        },
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

fn merge(target: &mut Row, changes: Row) {
    for (column, value) in changes {
        if column == "id" || column == "created_at" {
            continue;
        }
        target.insert(column, value);
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn select(&self, collection: Collection, query: &Query) -> ResultPersistence<Vec<Row>> {
        check_columns(collection, query)?;
        let rows = self.rows.read().await;
        let mut selected: Vec<Row> = rows
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        query.filters.iter().all(|(column, expected)| {
                            column_text(row, column).as_deref() == Some(expected.as_str())
                        })
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(ordering) = &query.ordering {
            selected.sort_by(|a, b| {
                let order = compare(a.get(&ordering.column), b.get(&ordering.column));
                match ordering.direction {
                    Direction::Ascending => order,
                    Direction::Descending => order.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            selected.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        Ok(selected)
    }

    async fn find(&self, collection: Collection, id: Uuid) -> ResultPersistence<Option<Row>> {
        let id = id.to_string();
        let rows = self.rows.read().await;
        Ok(rows
            .get(&collection)
            .and_then(|rows| rows.iter().find(|row| row_id(row) == Some(id.as_str())))
            .cloned())
    }

    async fn count(&self, collection: Collection) -> ResultPersistence<u64> {
        let rows = self.rows.read().await;
        Ok(rows.get(&collection).map_or(0, |rows| rows.len() as u64))
    }

    async fn insert(&self, collection: Collection, row: Row) -> ResultPersistence<Row> {
        self.check_writable()?;
        let mut stored = Row::new();
        stored.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        merge(&mut stored, row);
        stored.insert("created_at".to_string(), serde_json::to_value(Utc::now())?);

        self.rows
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, collection: Collection, id: Uuid, row: Row) -> ResultPersistence<Row> {
        self.check_writable()?;
        let key = id.to_string();
        let mut rows = self.rows.write().await;
        let stored = rows
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|row| row_id(row) == Some(key.as_str())))
            .ok_or(PersistenceError::NotFound { collection, id })?;

        merge(stored, row);
        Ok(stored.clone())
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> ResultPersistence<()> {
        self.check_writable()?;
        let key = id.to_string();
        let mut rows = self.rows.write().await;
        let rows = rows
            .get_mut(&collection)
            .ok_or(PersistenceError::NotFound { collection, id })?;
        let position = rows
            .iter()
            .position(|row| row_id(row) == Some(key.as_str()))
            .ok_or(PersistenceError::NotFound { collection, id })?;
        rows.remove(position);
        Ok(())
    }
}
