//! Income, expense and balance totals over ledger entries.
//!
//! Everything here is pure: callers load the transactions, pick a month and
//! ask for the totals again whenever either changes.

use std::io;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Category, EngineError, MoneyCents, ResultEngine, Transaction};

/// Totals of a set of transactions. `balance` is always `income - expense`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub income: MoneyCents,
    pub expense: MoneyCents,
    pub balance: MoneyCents,
}

/// Sums income and expense separately.
///
/// Totals saturate at the bounds of `i64` instead of overflowing; amounts
/// that went through [`Transaction`] validation cannot get there in practice.
///
/// ```
/// use engine::{MoneyCents, ledger::{Summary, summarize}};
///
/// assert_eq!(summarize(&[]), Summary::default());
/// assert_eq!(summarize(&[]).balance, MoneyCents::ZERO);
/// ```
pub fn summarize<'a, I>(transactions: I) -> Summary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut summary = Summary::default();
    for transaction in transactions {
        match transaction.category {
            Category::Income => {
                summary.income = summary.income.saturating_add(transaction.amount_minor);
            }
            Category::Expense => {
                summary.expense = summary.expense.saturating_add(transaction.amount_minor);
            }
        }
    }
    summary.balance = summary.income.saturating_sub(summary.expense);
    summary
}

/// Transactions dated in `month` (`YYYY-MM`), in input order.
///
/// An empty month is no filter at all.
pub fn filter_by_month<'a>(transactions: &'a [Transaction], month: &str) -> Vec<&'a Transaction> {
    if month.is_empty() {
        return transactions.iter().collect();
    }
    transactions
        .iter()
        .filter(|transaction| transaction.date.format("%Y-%m").to_string() == month)
        .collect()
}

/// Totals of the transactions dated in `month`.
pub fn summary_for_month(transactions: &[Transaction], month: &str) -> Summary {
    summarize(filter_by_month(transactions, month))
}

/// Checks a month filter typed by a user.
///
/// Blank input means "no filter" and yields `None`.
pub fn parse_month(raw: &str) -> ResultEngine<Option<String>> {
    let month = raw.trim();
    if month.is_empty() {
        return Ok(None);
    }

    let well_formed = month.len() == 7
        && month.as_bytes()[4] == b'-'
        && NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").is_ok();
    if !well_formed {
        return Err(EngineError::Validation(format!(
            "invalid month \"{month}\", expected YYYY-MM"
        )));
    }
    Ok(Some(month.to_string()))
}

#[derive(Serialize)]
struct ExportRow<'a> {
    date: String,
    category: &'static str,
    amount_minor: i64,
    description: &'a str,
    id: String,
}

/// Writes `transactions` as CSV with a header row.
pub fn write_csv<'a, W, I>(transactions: I, writer: W) -> ResultEngine<()>
where
    W: io::Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut writer = csv::Writer::from_writer(writer);
    for transaction in transactions {
        writer.serialize(ExportRow {
            date: transaction.date.to_string(),
            category: transaction.category.as_str(),
            amount_minor: transaction.amount_minor.cents(),
            description: &transaction.description,
            id: transaction.id.to_string(),
        })?;
    }
    writer
        .flush()
        .map_err(|err| EngineError::Export(err.to_string()))
}
