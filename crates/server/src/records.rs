//! Collection endpoints shared by every record kind.

use api_types::record::{AttachmentUpload, ListParams, ListResponse, RecordSubmit};
use axum::{
    Json,
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use engine::{Attachment, Direction, Ordering, Record, search_default};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
};

/// Sort requested by the query string, if any.
pub(crate) fn ordering(params: &ListParams) -> Result<Option<Ordering>, ServerError> {
    let Some(column) = &params.order_by else {
        return Ok(None);
    };
    let direction = match params.direction.as_deref() {
        Some(direction) => Direction::try_from(direction)?,
        None => Direction::default(),
    };
    Ok(Some(Ordering::new(column.clone(), direction)))
}

/// Keeps the records matching `q`, all of them when `q` is absent.
pub(crate) fn matching<R: Record>(records: Vec<R>, q: Option<&str>) -> Vec<R> {
    match q {
        Some(q) if !q.is_empty() => search_default(&records, q).into_iter().cloned().collect(),
        _ => records,
    }
}

fn decode_attachment(upload: AttachmentUpload) -> Result<Attachment, ServerError> {
    let bytes = STANDARD
        .decode(upload.data.as_bytes())
        .map_err(|err| ServerError::Generic(format!("attachment is not valid base64: {err}")))?;
    Ok(Attachment {
        filename: upload.filename,
        content_type: upload.content_type,
        bytes,
    })
}

pub async fn list<R: Record>(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<R>>, ServerError> {
    let records = state.store.list::<R>(ordering(&params)?).await?;
    Ok(Json(ListResponse {
        items: matching(records, params.q.as_deref()),
    }))
}

pub async fn create<R: Record>(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<RecordSubmit<R::Draft>>,
) -> Result<(StatusCode, Json<R>), ServerError> {
    let attachment = payload.attachment.map(decode_attachment).transpose()?;
    let record = state.store.create::<R>(payload.fields, attachment).await?;
    tracing::info!("{user} created {} {}", R::COLLECTION, record.id());
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update<R: Record>(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordSubmit<R::Draft>>,
) -> Result<Json<R>, ServerError> {
    let attachment = payload.attachment.map(decode_attachment).transpose()?;
    let record = state.store.update::<R>(id, payload.fields, attachment).await?;
    tracing::info!("{user} updated {} {id}", R::COLLECTION);
    Ok(Json(record))
}

pub async fn remove<R: Record>(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.store.remove::<R>(id).await?;
    tracing::info!("{user} removed {} {id}", R::COLLECTION);
    Ok(StatusCode::NO_CONTENT)
}
