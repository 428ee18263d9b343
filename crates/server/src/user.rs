//! Account sign-up.

use api_types::user::RegisterRequest;
use axum::{Json, extract::State, http::StatusCode};
use engine::accounts::Registration;

use crate::{ServerError, server::ServerState};

/// Creates an account. Open to anonymous callers.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<StatusCode, ServerError> {
    let registration = Registration {
        email: payload.email,
        password: payload.password,
        confirm_password: payload.confirm_password,
    };
    state.accounts.register(&registration).await?;

    Ok(StatusCode::CREATED)
}
