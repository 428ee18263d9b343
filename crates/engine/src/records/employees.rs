use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Collection, Ordering, ResultEngine};

use super::{AttachmentSlot, Record, require};

/// Staff member with an optional photo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    /// Civil-service badge number (NIP).
    pub badge_number: String,
    pub job_title: String,
    pub work_unit: String,
    /// Email address or phone number.
    pub contact: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDraft {
    pub name: String,
    pub badge_number: String,
    pub job_title: String,
    pub work_unit: String,
    pub contact: String,
}

impl Record for Employee {
    type Draft = EmployeeDraft;

    const COLLECTION: Collection = Collection::Employees;
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "badge_number"];
    const ATTACHMENT: Option<AttachmentSlot> = Some(AttachmentSlot {
        field: "photo_url",
        bucket: "photos",
        folder: "employees",
        accepts: &["jpg", "jpeg", "png"],
    });

    fn default_ordering() -> Ordering {
        Ordering::asc("name")
    }

    fn validate(draft: &EmployeeDraft) -> ResultEngine<()> {
        require(&draft.name, "name")?;
        require(&draft.badge_number, "badge number")?;
        require(&draft.job_title, "job title")?;
        require(&draft.work_unit, "work unit")?;
        require(&draft.contact, "contact")
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn attachment(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "name" => &self.name,
            "badge_number" => &self.badge_number,
            "job_title" => &self.job_title,
            "work_unit" => &self.work_unit,
            "contact" => &self.contact,
            _ => return None,
        };
        Some(Cow::Borrowed(value.as_str()))
    }
}
