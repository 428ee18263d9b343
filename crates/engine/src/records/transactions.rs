//! Ledger entries.
//!
//! A `Transaction` is a single income or expense line on the office ledger.
//! Amounts are kept in integer cents; see [`MoneyCents`].

use std::{borrow::Cow, fmt};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Collection, EngineError, MoneyCents, Ordering, ResultEngine};

use super::{Record, require};

/// Either side of the ledger.
///
/// The legacy Indonesian labels (`pemasukan`, `pengeluaran`) are accepted on
/// input so rows exported from the old dashboard import unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[serde(alias = "pemasukan")]
    Income,
    #[serde(alias = "pengeluaran")]
    Expense,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Category {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" | "pemasukan" => Ok(Self::Income),
            "expense" | "pengeluaran" => Ok(Self::Expense),
            other => Err(EngineError::Validation(format!(
                "invalid category: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    pub category: Category,
    pub amount_minor: MoneyCents,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub category: Category,
    pub amount_minor: MoneyCents,
    pub description: String,
}

impl TransactionDraft {
    /// Builds a draft from raw form text: an ISO date, a category label and a
    /// decimal amount such as `150000,50`.
    pub fn parse(
        date: &str,
        category: &str,
        amount: &str,
        description: &str,
    ) -> ResultEngine<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| EngineError::Validation(format!("invalid date: {date}")))?;
        Ok(Self {
            date,
            category: Category::try_from(category)?,
            amount_minor: MoneyCents::parse_non_negative(amount)?,
            description: description.trim().to_string(),
        })
    }
}

impl Record for Transaction {
    type Draft = TransactionDraft;

    const COLLECTION: Collection = Collection::Transactions;
    const SEARCH_FIELDS: &'static [&'static str] = &["description"];

    fn default_ordering() -> Ordering {
        Ordering::desc("date")
    }

    fn validate(draft: &TransactionDraft) -> ResultEngine<()> {
        draft.amount_minor.check_entry()?;
        require(&draft.description, "description")
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "description" => Some(Cow::Borrowed(self.description.as_str())),
            "category" => Some(Cow::Borrowed(self.category.as_str())),
            "date" => Some(Cow::Owned(self.date.to_string())),
            _ => None,
        }
    }
}
