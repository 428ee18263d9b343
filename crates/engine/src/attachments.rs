//! Storage paths and public URLs of attachments.
//!
//! A stored object is addressed two ways: by its storage path inside a bucket
//! (`employees/3f2a...-1717171717171.png`) and by the public URL saved on the
//! record. Uploads go from a filename to a path, deletions go from the saved
//! URL back to the path.

use chrono::Utc;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Fixed segment between the storage host and the bucket in public URLs.
pub const STORAGE_MARKER: &str = "/storage/v1/object/public/";

/// Text after the last `.` of `filename`.
///
/// A name without any `.` is returned whole.
pub fn extension_of(filename: &str) -> &str {
    filename.rsplit('.').next().unwrap_or(filename)
}

/// Builds a fresh storage path for an upload into `folder`.
///
/// The path is `folder/<random token>-<unix millis>.<extension>`. The token
/// only makes collisions unlikely; it is not meant to be unguessable.
pub fn build_storage_path(folder: &str, filename: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    let millis = Utc::now().timestamp_millis();
    format!(
        "{}/{token}-{millis}.{}",
        folder.trim_end_matches('/'),
        extension_of(filename)
    )
}

/// Maps a public URL saved on a record back to its storage path in `bucket`.
///
/// ```
/// use engine::attachments::resolve_storage_path;
///
/// let url = "https://files.example/storage/v1/object/public/documents/archives/a-1.pdf";
/// assert_eq!(resolve_storage_path("documents", url).unwrap(), "archives/a-1.pdf");
/// assert!(resolve_storage_path("photos", url).is_err());
/// ```
pub fn resolve_storage_path(bucket: &str, public_url: &str) -> ResultEngine<String> {
    let marker = format!("{STORAGE_MARKER}{bucket}/");
    let without_fragment = public_url.split('#').next().unwrap_or(public_url);
    let without_query = without_fragment
        .split('?')
        .next()
        .unwrap_or(without_fragment);

    match without_query.split_once(marker.as_str()) {
        Some((_, path)) if !path.is_empty() => Ok(path.to_string()),
        _ => Err(EngineError::MalformedReference(public_url.to_string())),
    }
}

/// Public URL of `path` in `bucket` for a store reachable at `base_url`.
pub fn public_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}{STORAGE_MARKER}{bucket}/{path}",
        base_url.trim_end_matches('/')
    )
}
