//! Incoming and outgoing correspondence.
//!
//! Both registers share the same shape; they differ only in the counterparty
//! column (`sender` for incoming mail, `recipient` for outgoing mail) and in
//! the storage folder their scanned files land in.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Collection, Ordering, ResultEngine};

use super::{AttachmentSlot, Record, require};

const LETTER_EXTENSIONS: &[&str] = &["pdf"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingLetter {
    pub id: Uuid,
    pub letter_number: String,
    pub sender: String,
    pub date: NaiveDate,
    pub subject: String,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingLetterDraft {
    pub letter_number: String,
    pub sender: String,
    pub date: NaiveDate,
    pub subject: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingLetter {
    pub id: Uuid,
    pub letter_number: String,
    pub recipient: String,
    pub date: NaiveDate,
    pub subject: String,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingLetterDraft {
    pub letter_number: String,
    pub recipient: String,
    pub date: NaiveDate,
    pub subject: String,
}

impl Record for IncomingLetter {
    type Draft = IncomingLetterDraft;

    const COLLECTION: Collection = Collection::IncomingLetters;
    const SEARCH_FIELDS: &'static [&'static str] = &["letter_number", "subject", "sender"];
    const ATTACHMENT: Option<AttachmentSlot> = Some(AttachmentSlot {
        field: "file_url",
        bucket: "documents",
        folder: "incoming-letters",
        accepts: LETTER_EXTENSIONS,
    });

    fn default_ordering() -> Ordering {
        Ordering::desc("date")
    }

    fn validate(draft: &IncomingLetterDraft) -> ResultEngine<()> {
        require(&draft.letter_number, "letter number")?;
        require(&draft.sender, "sender")?;
        require(&draft.subject, "subject")
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn attachment(&self) -> Option<&str> {
        self.file_url.as_deref()
    }

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "letter_number" => Some(Cow::Borrowed(self.letter_number.as_str())),
            "sender" => Some(Cow::Borrowed(self.sender.as_str())),
            "subject" => Some(Cow::Borrowed(self.subject.as_str())),
            "date" => Some(Cow::Owned(self.date.to_string())),
            _ => None,
        }
    }
}

impl Record for OutgoingLetter {
    type Draft = OutgoingLetterDraft;

    const COLLECTION: Collection = Collection::OutgoingLetters;
    const SEARCH_FIELDS: &'static [&'static str] = &["letter_number", "subject", "recipient"];
    const ATTACHMENT: Option<AttachmentSlot> = Some(AttachmentSlot {
        field: "file_url",
        bucket: "documents",
        folder: "outgoing-letters",
        accepts: LETTER_EXTENSIONS,
    });

    fn default_ordering() -> Ordering {
        Ordering::desc("date")
    }

    fn validate(draft: &OutgoingLetterDraft) -> ResultEngine<()> {
        require(&draft.letter_number, "letter number")?;
        require(&draft.recipient, "recipient")?;
        require(&draft.subject, "subject")
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn attachment(&self) -> Option<&str> {
        self.file_url.as_deref()
    }

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "letter_number" => Some(Cow::Borrowed(self.letter_number.as_str())),
            "recipient" => Some(Cow::Borrowed(self.recipient.as_str())),
            "subject" => Some(Cow::Borrowed(self.subject.as_str())),
            "date" => Some(Cow::Owned(self.date.to_string())),
            _ => None,
        }
    }
}
