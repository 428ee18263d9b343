use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod record {
    use super::*;

    /// Query string accepted by every collection listing.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ListParams {
        /// Free-text search over the collection's usual search fields.
        pub q: Option<String>,
        pub order_by: Option<String>,
        /// `asc` or `desc`; only read together with `order_by`.
        pub direction: Option<String>,
        /// `YYYY-MM`, transactions only.
        pub month: Option<String>,
        /// `income` or `expense`, transactions only.
        pub category: Option<String>,
    }

    /// A file sent inside a JSON body.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AttachmentUpload {
        pub filename: String,
        pub content_type: Option<String>,
        /// File content, standard base64.
        pub data: String,
    }

    /// Body of a create or update request: the record's editable fields plus
    /// an optional attachment.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordSubmit<D> {
        #[serde(flatten)]
        pub fields: D,
        pub attachment: Option<AttachmentUpload>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ListResponse<T> {
        pub items: Vec<T>,
    }
}

pub mod ledger {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MonthParams {
        /// `YYYY-MM`; absent or empty means every month.
        pub month: Option<String>,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SummaryView {
        pub month: Option<String>,
        pub income_minor: i64,
        pub expense_minor: i64,
        pub balance_minor: i64,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ActivityView {
        pub id: Uuid,
        /// Collection the entry belongs to, e.g. `incoming_letters`.
        pub collection: String,
        pub description: String,
        pub at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardView {
        pub employees: u64,
        pub incoming_letters: u64,
        pub outgoing_letters: u64,
        pub archives: u64,
        pub ledger: super::ledger::SummaryView,
        pub recent_activity: Vec<ActivityView>,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub email: String,
        pub password: String,
        pub confirm_password: String,
    }
}
