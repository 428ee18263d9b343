use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use tower_http::services::ServeDir;

use std::{path::PathBuf, sync::Arc};

use crate::{dashboard, ledger, records, user};
use engine::{
    Archive, Employee, IncomingLetter, OutgoingLetter, RecordStore, Transaction,
    accounts::Accounts, attachments::STORAGE_MARKER,
};

#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<RecordStore>,
    pub accounts: Accounts,
    /// Directory served under the public object prefix.
    pub public_objects: Option<PathBuf>,
}

impl ServerState {
    pub fn new(store: RecordStore, accounts: Accounts) -> Self {
        Self {
            store: Arc::new(store),
            accounts,
            public_objects: None,
        }
    }

    /// Serves the files under `root` at `/storage/v1/object/public/`.
    pub fn with_public_objects(mut self, root: impl Into<PathBuf>) -> Self {
        self.public_objects = Some(root.into());
        self
    }
}

/// The signed-in account, as checked by [`auth`].
#[derive(Clone, Debug)]
pub struct CurrentUser(pub String);

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let known = state
        .accounts
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|err| {
            tracing::error!("authentication failed: {err}");
            StatusCode::UNAUTHORIZED
        })?;
    if !known {
        return Err(StatusCode::UNAUTHORIZED);
    }

    request
        .extensions_mut()
        .insert(CurrentUser(auth_header.username().to_string()));
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let public_objects = state.public_objects.clone();

    let router = Router::new()
        .route(
            "/employees",
            get(records::list::<Employee>).post(records::create::<Employee>),
        )
        .route(
            "/employees/{id}",
            put(records::update::<Employee>).delete(records::remove::<Employee>),
        )
        .route(
            "/incoming-letters",
            get(records::list::<IncomingLetter>).post(records::create::<IncomingLetter>),
        )
        .route(
            "/incoming-letters/{id}",
            put(records::update::<IncomingLetter>).delete(records::remove::<IncomingLetter>),
        )
        .route(
            "/outgoing-letters",
            get(records::list::<OutgoingLetter>).post(records::create::<OutgoingLetter>),
        )
        .route(
            "/outgoing-letters/{id}",
            put(records::update::<OutgoingLetter>).delete(records::remove::<OutgoingLetter>),
        )
        .route(
            "/archives",
            get(records::list::<Archive>).post(records::create::<Archive>),
        )
        .route(
            "/archives/{id}",
            put(records::update::<Archive>).delete(records::remove::<Archive>),
        )
        .route(
            "/transactions",
            get(ledger::list).post(records::create::<Transaction>),
        )
        .route("/transactions/summary", get(ledger::summary))
        .route("/transactions/export", get(ledger::export))
        .route(
            "/transactions/{id}",
            put(records::update::<Transaction>).delete(records::remove::<Transaction>),
        )
        .route("/dashboard", get(dashboard::get))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/register", axum::routing::post(user::register));

    let router = match public_objects {
        Some(root) => router.nest_service(
            STORAGE_MARKER.trim_end_matches('/'),
            ServeDir::new(root),
        ),
        None => router,
    };

    router.with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}
