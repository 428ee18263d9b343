//! Landing-page figures: collection sizes, ledger totals and recent mail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Archive, Collection, Employee, IncomingLetter, Ordering, OutgoingLetter, Query, RecordStore,
    ResultEngine, Transaction,
    ledger::{Summary, summarize},
};

/// How many recent entries the overview carries.
pub const RECENT_ACTIVITY_LIMIT: u64 = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub collection: Collection,
    pub description: String,
    pub at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    pub employees: u64,
    pub incoming_letters: u64,
    pub outgoing_letters: u64,
    pub archives: u64,
    /// All-time ledger totals.
    pub ledger: Summary,
    /// Latest incoming letters, newest first.
    pub recent_activity: Vec<Activity>,
}

impl RecordStore {
    pub async fn overview(&self) -> ResultEngine<Overview> {
        let transactions: Vec<Transaction> = self.list(None).await?;
        let recent: Vec<IncomingLetter> = self
            .query(Query::ordered(Ordering::desc("created_at")).limit(RECENT_ACTIVITY_LIMIT))
            .await?;

        Ok(Overview {
            employees: self.count::<Employee>().await?,
            incoming_letters: self.count::<IncomingLetter>().await?,
            outgoing_letters: self.count::<OutgoingLetter>().await?,
            archives: self.count::<Archive>().await?,
            ledger: summarize(&transactions),
            recent_activity: recent
                .into_iter()
                .map(|letter| Activity {
                    id: letter.id,
                    collection: Collection::IncomingLetters,
                    description: letter.subject,
                    at: letter.created_at,
                })
                .collect(),
        })
    }
}
