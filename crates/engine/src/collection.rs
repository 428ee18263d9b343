//! Collections and the query shape the persistence layer understands.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{EngineError, ResultEngine};

/// A stored record as seen by a [`Persistence`](crate::Persistence) backend:
/// a flat JSON object keyed by column name.
pub type Row = Map<String, Value>;

/// The named collections managed by the office dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Employees,
    IncomingLetters,
    OutgoingLetters,
    Archives,
    Transactions,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Self::Employees,
        Self::IncomingLetters,
        Self::OutgoingLetters,
        Self::Archives,
        Self::Transactions,
    ];

    /// Table name used by the persistence layer.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Employees => "employees",
            Self::IncomingLetters => "incoming_letters",
            Self::OutgoingLetters => "outgoing_letters",
            Self::Archives => "archives",
            Self::Transactions => "transactions",
        }
    }

    /// Columns a row of the collection carries.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Employees => &[
                "id",
                "name",
                "badge_number",
                "job_title",
                "work_unit",
                "contact",
                "photo_url",
                "created_at",
            ],
            Self::IncomingLetters => &[
                "id",
                "letter_number",
                "sender",
                "date",
                "subject",
                "file_url",
                "created_at",
            ],
            Self::OutgoingLetters => &[
                "id",
                "letter_number",
                "recipient",
                "date",
                "subject",
                "file_url",
                "created_at",
            ],
            Self::Archives => &[
                "id",
                "title",
                "document_type",
                "date",
                "notes",
                "file_url",
                "created_at",
            ],
            Self::Transactions => &[
                "id",
                "date",
                "category",
                "amount_minor",
                "description",
                "created_at",
            ],
        }
    }

    pub fn has_column(self, column: &str) -> bool {
        self.columns().contains(&column)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Collection {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|collection| collection.as_str() == value)
            .ok_or_else(|| EngineError::Validation(format!("unknown collection: {value}")))
    }
}

/// Sort direction of a listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl TryFrom<&str> for Direction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(EngineError::Validation(format!(
                "invalid direction: {other}"
            ))),
        }
    }
}

/// Column and direction a listing is sorted by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ordering {
    pub column: String,
    pub direction: Direction,
}

impl Ordering {
    pub fn new(column: impl Into<String>, direction: Direction) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, Direction::Ascending)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, Direction::Descending)
    }
}

/// A `select` against one collection.
///
/// Equality filters compare the textual form of a column, which covers the
/// enumerated and free-text columns the dashboard filters on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pub ordering: Option<Ordering>,
    pub filters: Vec<(String, String)>,
    pub limit: Option<u64>,
}

impl Query {
    pub fn ordered(ordering: Ordering) -> Self {
        Self {
            ordering: Some(ordering),
            ..Self::default()
        }
    }

    /// Adds an equality filter on `column`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Reads a column as text, the way equality filters and search compare it.
pub(crate) fn column_text(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Checks that `column` is a plain identifier before it reaches a backend.
pub(crate) fn ensure_column_name(column: &str) -> ResultEngine<()> {
    if column.is_empty()
        || !column
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(EngineError::Validation(format!(
            "invalid column name: {column}"
        )));
    }
    Ok(())
}
