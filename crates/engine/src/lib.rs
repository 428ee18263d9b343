//! Records, attachments and ledger totals of the office dashboard.
//!
//! [`RecordStore`] is the entry point for every write: it validates a draft,
//! uploads its attachment through an [`ObjectStorage`] and stores the row
//! through a [`Persistence`] backend. Search and ledger totals are pure
//! functions over records the caller already loaded.

pub use collection::{Collection, Direction, Ordering, Query, Row};
pub use dashboard::{Activity, Overview};
pub use error::{EngineError, PersistenceError, StorageError};
pub use ledger::Summary;
pub use money::MoneyCents;
pub use persistence::{DatabasePersistence, MemoryPersistence, Persistence};
pub use record_store::{OrphanedObject, RecordStore, RecordStoreBuilder};
pub use records::{
    Archive, ArchiveDraft, AttachmentSlot, Category, Employee, EmployeeDraft, IncomingLetter,
    IncomingLetterDraft, OutgoingLetter, OutgoingLetterDraft, Record, Transaction,
    TransactionDraft,
};
pub use search::{search, search_default};
pub use storage::{Attachment, LocalObjectStorage, MemoryObjectStorage, ObjectStorage};

pub mod accounts;
pub mod attachments;
mod collection;
mod dashboard;
mod error;
pub mod ledger;
mod money;
mod persistence;
mod record_store;
mod records;
mod search;
mod storage;

type ResultEngine<T> = Result<T, EngineError>;
