use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{Collection, Direction, PersistenceError, Query, Row};

use super::{Persistence, ResultPersistence};

/// Runs `$body` with `$entity` bound to the sea-orm entity module of
/// `$collection`.
macro_rules! with_entity {
    ($collection:expr, $entity:ident => $body:expr) => {{
        match $collection {
            Collection::Employees => {
                use crate::persistence::entities::employees as $entity;
                $body
            }
            Collection::IncomingLetters => {
                use crate::persistence::entities::incoming_letters as $entity;
                $body
            }
            Collection::OutgoingLetters => {
                use crate::persistence::entities::outgoing_letters as $entity;
                $body
            }
            Collection::Archives => {
                use crate::persistence::entities::archives as $entity;
                $body
            }
            Collection::Transactions => {
                use crate::persistence::entities::transactions as $entity;
                $body
            }
        }
    }};
}

/// [`Persistence`] over a sea-orm connection (SQLite in production).
///
/// The schema comes from the `migration` crate; run it before handing the
/// connection over.
#[derive(Debug, Clone)]
pub struct DatabasePersistence {
    database: DatabaseConnection,
}

impl DatabasePersistence {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.database
    }
}

fn to_row<M: Serialize>(model: &M) -> ResultPersistence<Row> {
    match serde_json::to_value(model)? {
        Value::Object(row) => Ok(row),
        other => Err(PersistenceError::Decode(format!(
            "expected an object, got {other}"
        ))),
    }
}

fn unknown_column(column: &str) -> PersistenceError {
    PersistenceError::UnknownColumn(column.to_string())
}

#[async_trait]
impl Persistence for DatabasePersistence {
    async fn select(&self, collection: Collection, query: &Query) -> ResultPersistence<Vec<Row>> {
        with_entity!(collection, entity => {
            let mut select = entity::Entity::find();
            for (column, value) in &query.filters {
                let column = entity::Column::from_str(column).map_err(|_| unknown_column(column))?;
                select = select.filter(column.eq(value.clone()));
            }
            if let Some(ordering) = &query.ordering {
                let column = entity::Column::from_str(&ordering.column)
                    .map_err(|_| unknown_column(&ordering.column))?;
                select = match ordering.direction {
                    Direction::Ascending => select.order_by_asc(column),
                    Direction::Descending => select.order_by_desc(column),
                };
            }
            if let Some(limit) = query.limit {
                select = select.limit(limit);
            }

            let models = select.all(&self.database).await?;
            models.iter().map(to_row).collect()
        })
    }

    async fn find(&self, collection: Collection, id: Uuid) -> ResultPersistence<Option<Row>> {
        with_entity!(collection, entity => {
            match entity::Entity::find_by_id(id).one(&self.database).await? {
                Some(model) => Ok(Some(to_row(&model)?)),
                None => Ok(None),
            }
        })
    }

    async fn count(&self, collection: Collection) -> ResultPersistence<u64> {
        with_entity!(collection, entity => {
            Ok(entity::Entity::find().count(&self.database).await?)
        })
    }

    async fn insert(&self, collection: Collection, mut row: Row) -> ResultPersistence<Row> {
        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        row.insert("created_at".to_string(), serde_json::to_value(Utc::now())?);

        with_entity!(collection, entity => {
            let active = entity::ActiveModel::from_json(Value::Object(row))?;
            let model = active.insert(&self.database).await?;
            to_row(&model)
        })
    }

    async fn update(&self, collection: Collection, id: Uuid, row: Row) -> ResultPersistence<Row> {
        with_entity!(collection, entity => {
            let existing = entity::Entity::find_by_id(id)
                .one(&self.database)
                .await?
                .ok_or(PersistenceError::NotFound { collection, id })?;

            let mut merged = to_row(&existing)?;
            for (column, value) in row {
                if column != "id" && column != "created_at" {
                    merged.insert(column, value);
                }
            }

            let active = entity::ActiveModel::from_json(Value::Object(merged))?;
            let model = active.update(&self.database).await?;
            to_row(&model)
        })
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> ResultPersistence<()> {
        with_entity!(collection, entity => {
            let result = entity::Entity::delete_by_id(id).exec(&self.database).await?;
            if result.rows_affected == 0 {
                return Err(PersistenceError::NotFound { collection, id });
            }
            Ok(())
        })
    }
}
