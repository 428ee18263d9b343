use api_types::{
    ledger::{MonthParams, SummaryView},
    record::{ListParams, ListResponse},
};
use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use engine::{
    Category, Query as StoreQuery, Summary, Transaction,
    ledger::{filter_by_month, parse_month, summarize, write_csv},
};

use crate::{
    ServerError,
    records::{matching, ordering},
    server::ServerState,
};

pub(crate) fn summary_view(month: Option<String>, summary: Summary) -> SummaryView {
    SummaryView {
        month,
        income_minor: summary.income.cents(),
        expense_minor: summary.expense.cents(),
        balance_minor: summary.balance.cents(),
    }
}

/// Transactions of the requested month, with the validated month.
async fn load(
    state: &ServerState,
    month: Option<&str>,
) -> Result<(Option<String>, Vec<Transaction>), ServerError> {
    let month = parse_month(month.unwrap_or_default())?;
    let transactions: Vec<Transaction> = state.store.list(None).await?;
    let selected = filter_by_month(&transactions, month.as_deref().unwrap_or_default())
        .into_iter()
        .cloned()
        .collect();
    Ok((month, selected))
}

/// Ledger listing with the month and category filters on top of the usual
/// search and sort.
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<Transaction>>, ServerError> {
    let month = parse_month(params.month.as_deref().unwrap_or_default())?;

    let mut query = StoreQuery::default();
    query.ordering = ordering(&params)?;
    if let Some(category) = params.category.as_deref().filter(|c| !c.is_empty()) {
        query = query.eq("category", Category::try_from(category)?.as_str());
    }

    let transactions: Vec<Transaction> = state.store.query(query).await?;
    let in_month: Vec<Transaction> =
        filter_by_month(&transactions, month.as_deref().unwrap_or_default())
            .into_iter()
            .cloned()
            .collect();

    Ok(Json(ListResponse {
        items: matching(in_month, params.q.as_deref()),
    }))
}

pub async fn summary(
    State(state): State<ServerState>,
    Query(params): Query<MonthParams>,
) -> Result<Json<SummaryView>, ServerError> {
    let (month, transactions) = load(&state, params.month.as_deref()).await?;
    Ok(Json(summary_view(month, summarize(&transactions))))
}

pub async fn export(
    State(state): State<ServerState>,
    Query(params): Query<MonthParams>,
) -> Result<impl IntoResponse, ServerError> {
    let (month, transactions) = load(&state, params.month.as_deref()).await?;

    let mut data = Vec::new();
    write_csv(&transactions, &mut data)?;

    let filename = match month {
        Some(month) => format!("transactions-{month}.csv"),
        None => "transactions.csv".to_string(),
    };
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        data,
    ))
}
