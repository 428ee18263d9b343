use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Collection, Ordering, ResultEngine};

use super::{AttachmentSlot, Record, require};

/// Archived document (decree, report, contract...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    pub id: Uuid,
    pub title: String,
    pub document_type: String,
    pub date: NaiveDate,
    pub notes: String,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDraft {
    pub title: String,
    pub document_type: String,
    pub date: NaiveDate,
    pub notes: String,
}

impl Record for Archive {
    type Draft = ArchiveDraft;

    const COLLECTION: Collection = Collection::Archives;
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "document_type"];
    const ATTACHMENT: Option<AttachmentSlot> = Some(AttachmentSlot {
        field: "file_url",
        bucket: "documents",
        folder: "archives",
        accepts: &["pdf"],
    });

    fn default_ordering() -> Ordering {
        Ordering::desc("date")
    }

    fn validate(draft: &ArchiveDraft) -> ResultEngine<()> {
        require(&draft.title, "title")?;
        require(&draft.document_type, "document type")?;
        require(&draft.notes, "notes")
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn attachment(&self) -> Option<&str> {
        self.file_url.as_deref()
    }

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "title" => Some(Cow::Borrowed(self.title.as_str())),
            "document_type" => Some(Cow::Borrowed(self.document_type.as_str())),
            "notes" => Some(Cow::Borrowed(self.notes.as_str())),
            "date" => Some(Cow::Owned(self.date.to_string())),
            _ => None,
        }
    }
}
