//! The object store attachments are uploaded to.

use async_trait::async_trait;

use crate::StorageError;

pub use local::LocalObjectStorage;
pub use memory::MemoryObjectStorage;

mod local;
mod memory;

pub(crate) type ResultStorage<T> = Result<T, StorageError>;

/// A file submitted together with a record form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// Name of the file on the submitter's machine, used for its extension.
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Bucketed blob storage with public URLs.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` at `path` inside `bucket` and returns the public URL.
    ///
    /// Never overwrites: an existing object is an error.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> ResultStorage<String>;

    /// Removes the objects at `paths`. Missing objects are not an error.
    async fn remove(&self, bucket: &str, paths: &[String]) -> ResultStorage<()>;

    /// Every object path currently stored in `bucket`.
    async fn list(&self, bucket: &str) -> ResultStorage<Vec<String>>;
}

/// Rejects paths that could escape their bucket.
pub(crate) fn check_path(path: &str) -> ResultStorage<()> {
    let escapes = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if escapes {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}
