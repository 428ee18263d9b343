//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown before any remote call when a draft, an attachment
//!   or a registration is not acceptable.
//! - [`Persistence`] thrown when the collection store rejects an operation.
//! - [`Upload`] thrown when an attachment could not be stored.
//! - [`MalformedReference`] thrown when a stored attachment reference cannot be
//!   mapped back to a storage path.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`Persistence`]: EngineError::Persistence
//!  [`Upload`]: EngineError::Upload
//!  [`MalformedReference`]: EngineError::MalformedReference
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::Collection;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("Upload failed: {0}")]
    Upload(StorageError),
    #[error("Attachment cleanup failed: {0}")]
    Storage(StorageError),
    #[error("Malformed attachment reference: {0}")]
    MalformedReference(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error("Already exists: {0}")]
    Conflict(String),
}

/// Errors raised by a [`Persistence`](crate::Persistence) backend.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("{collection} record \"{id}\" not found!")]
    NotFound { collection: Collection, id: Uuid },
    #[error("unknown column \"{0}\"")]
    UnknownColumn(String),
    #[error("cannot decode row: {0}")]
    Decode(String),
    #[error("collection store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Errors raised by an [`ObjectStorage`](crate::ObjectStorage) backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("invalid object path \"{0}\"")]
    InvalidPath(String),
    #[error("object \"{0}\" already exists")]
    AlreadyExists(String),
    #[error("storage rejected the request: {0}")]
    Rejected(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for EngineError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

impl EngineError {
    /// Returns `true` when the error means the addressed record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Persistence(PersistenceError::NotFound { .. })
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::MalformedReference(a), Self::MalformedReference(b)) => a == b,
            (Self::InvalidConfig(a), Self::InvalidConfig(b)) => a == b,
            (Self::Export(a), Self::Export(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Persistence(a), Self::Persistence(b)) => a.to_string() == b.to_string(),
            (Self::Upload(a), Self::Upload(b)) => a.to_string() == b.to_string(),
            (Self::Storage(a), Self::Storage(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
