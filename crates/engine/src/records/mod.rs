//! Record kinds managed by the dashboard.
//!
//! Every kind is a flat row with a persistence-assigned id, required scalar
//! fields, an optional attachment reference and a creation timestamp. The
//! editable part of a kind is its *draft*: what a form submits on create and
//! on a full-field update.

use std::borrow::Cow;

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Collection, EngineError, Ordering, ResultEngine};

pub use archives::{Archive, ArchiveDraft};
pub use employees::{Employee, EmployeeDraft};
pub use letters::{IncomingLetter, IncomingLetterDraft, OutgoingLetter, OutgoingLetterDraft};
pub use transactions::{Category, Transaction, TransactionDraft};

mod archives;
mod employees;
mod letters;
mod transactions;

/// Where a record kind keeps its single optional file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttachmentSlot {
    /// Column holding the public URL.
    pub field: &'static str,
    pub bucket: &'static str,
    /// Folder inside the bucket new uploads land in.
    pub folder: &'static str,
    /// Lowercase file extensions the slot accepts.
    pub accepts: &'static [&'static str],
}

impl AttachmentSlot {
    /// Rejects a file whose extension the slot does not take.
    pub fn check_filename(&self, filename: &str) -> ResultEngine<()> {
        let extension = crate::attachments::extension_of(filename).to_ascii_lowercase();
        if self.accepts.iter().any(|accepted| *accepted == extension) {
            return Ok(());
        }
        Err(EngineError::Validation(format!(
            "file type .{extension} is not accepted, expected one of: {}",
            self.accepts.join(", ")
        )))
    }
}

/// A record kind stored in one collection.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Editable fields submitted by a form.
    type Draft: Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    const COLLECTION: Collection;
    const SEARCH_FIELDS: &'static [&'static str];
    const ATTACHMENT: Option<AttachmentSlot> = None;

    /// Listing order used when the caller does not pick one.
    fn default_ordering() -> Ordering;

    /// Checks a draft before anything is sent to a remote service.
    fn validate(draft: &Self::Draft) -> ResultEngine<()>;

    fn id(&self) -> Uuid;

    fn attachment(&self) -> Option<&str> {
        None
    }

    /// Textual value of a field, used by search.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// Fails with a validation error when a required text field is blank.
pub(crate) fn require(value: &str, label: &str) -> ResultEngine<()> {
    if value.trim().is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(())
}
