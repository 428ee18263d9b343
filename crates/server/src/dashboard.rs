use api_types::dashboard::{ActivityView, DashboardView};
use axum::{Json, extract::State};

use crate::{ServerError, ledger::summary_view, server::ServerState};

pub async fn get(State(state): State<ServerState>) -> Result<Json<DashboardView>, ServerError> {
    let overview = state.store.overview().await?;

    Ok(Json(DashboardView {
        employees: overview.employees,
        incoming_letters: overview.incoming_letters,
        outgoing_letters: overview.outgoing_letters,
        archives: overview.archives,
        ledger: summary_view(None, overview.ledger),
        recent_activity: overview
            .recent_activity
            .into_iter()
            .map(|activity| ActivityView {
                id: activity.id,
                collection: activity.collection.to_string(),
                description: activity.description,
                at: activity.at,
            })
            .collect(),
    }))
}
