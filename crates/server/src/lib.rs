use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, PersistenceError};

use serde::Serialize;
pub use server::{ServerState, router, run_with_listener};

mod dashboard;
mod ledger;
mod records;
mod server;
mod user;

pub mod types {
    pub mod record {
        pub use api_types::record::{AttachmentUpload, ListParams, ListResponse, RecordSubmit};
        pub use engine::{
            Archive, ArchiveDraft, Employee, EmployeeDraft, IncomingLetter, IncomingLetterDraft,
            OutgoingLetter, OutgoingLetterDraft, Transaction, TransactionDraft,
        };
    }

    pub mod ledger {
        pub use api_types::ledger::{MonthParams, SummaryView};
    }

    pub mod dashboard {
        pub use api_types::dashboard::{ActivityView, DashboardView};
    }

    pub mod user {
        pub use api_types::user::RegisterRequest;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Persistence(PersistenceError::NotFound { .. }) => StatusCode::NOT_FOUND,
        EngineError::Persistence(PersistenceError::UnknownColumn(_)) => StatusCode::BAD_REQUEST,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Upload(_) | EngineError::Storage(_) => StatusCode::BAD_GATEWAY,
        EngineError::Persistence(_)
        | EngineError::MalformedReference(_)
        | EngineError::InvalidConfig(_)
        | EngineError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Persistence(
            db_err @ (PersistenceError::Database(_)
            | PersistenceError::Decode(_)
            | PersistenceError::Unavailable(_)),
        ) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        err @ (EngineError::MalformedReference(_)
        | EngineError::InvalidConfig(_)
        | EngineError::Export(_)) => {
            tracing::error!("{err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use engine::{Collection, StorageError};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let err = EngineError::Persistence(PersistenceError::NotFound {
            collection: Collection::Archives,
            id: Uuid::new_v4(),
        });
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn storage_failures_map_to_502() {
        let err = EngineError::Upload(StorageError::Rejected("down".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn database_errors_are_hidden() {
        let err = EngineError::Persistence(PersistenceError::Decode("bad row".to_string()));
        assert_eq!(message_for_engine_error(err), "internal server error");
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
