use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    Archive, Attachment, AttachmentSlot, Collection, Employee, EngineError, IncomingLetter,
    ObjectStorage, Ordering, OutgoingLetter, Persistence, PersistenceError, Query, Record,
    ResultEngine, Row, Transaction,
    attachments::{build_storage_path, resolve_storage_path},
    collection::{column_text, ensure_column_name},
};

/// A stored object no record points at.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrphanedObject {
    pub bucket: String,
    pub path: String,
}

/// Create, read, update and delete records of every kind, keeping each
/// record's attachment in step with the row.
///
/// Writes with an attachment run as two dependent steps: the file is uploaded
/// first, then the row is written with the file's public URL. A failed upload
/// leaves the collection untouched. A failed write after a successful upload
/// leaves the file behind; [`RecordStore::orphaned_objects`] finds such files.
pub struct RecordStore {
    persistence: Arc<dyn Persistence>,
    storage: Arc<dyn ObjectStorage>,
    best_effort_cleanup: bool,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("best_effort_cleanup", &self.best_effort_cleanup)
            .finish_non_exhaustive()
    }
}

/// Every attachment slot in use, with the collection owning it.
fn attachment_slots() -> Vec<(Collection, AttachmentSlot)> {
    [
        (Employee::COLLECTION, Employee::ATTACHMENT),
        (IncomingLetter::COLLECTION, IncomingLetter::ATTACHMENT),
        (OutgoingLetter::COLLECTION, OutgoingLetter::ATTACHMENT),
        (Archive::COLLECTION, Archive::ATTACHMENT),
        (Transaction::COLLECTION, Transaction::ATTACHMENT),
    ]
    .into_iter()
    .filter_map(|(collection, slot)| slot.map(|slot| (collection, slot)))
    .collect()
}

fn decode<R: Record>(row: Row) -> ResultEngine<R> {
    serde_json::from_value(Value::Object(row))
        .map_err(|err| EngineError::Persistence(PersistenceError::from(err)))
}

fn encode<D: Serialize>(draft: &D) -> ResultEngine<Row> {
    match serde_json::to_value(draft).map_err(PersistenceError::from)? {
        Value::Object(row) => Ok(row),
        other => Err(EngineError::Validation(format!(
            "expected a set of fields, got {other}"
        ))),
    }
}

impl RecordStore {
    /// Return a builder for `RecordStore`.
    pub fn builder() -> RecordStoreBuilder {
        RecordStoreBuilder::default()
    }

    pub fn best_effort_cleanup(&self) -> bool {
        self.best_effort_cleanup
    }

    /// Lists every record of `R`, sorted by `ordering` or by the kind's
    /// default order.
    pub async fn list<R: Record>(&self, ordering: Option<Ordering>) -> ResultEngine<Vec<R>> {
        let ordering = ordering.unwrap_or_else(R::default_ordering);
        self.query(Query::ordered(ordering)).await
    }

    /// Lists the records of `R` matching `query`.
    ///
    /// A query without ordering uses the kind's default order.
    pub async fn query<R: Record>(&self, mut query: Query) -> ResultEngine<Vec<R>> {
        let ordering = query.ordering.get_or_insert_with(R::default_ordering);
        ensure_column_name(&ordering.column)?;
        for (column, _) in &query.filters {
            ensure_column_name(column)?;
        }

        let rows = self.persistence.select(R::COLLECTION, &query).await?;
        rows.into_iter().map(decode).collect()
    }

    pub async fn find<R: Record>(&self, id: Uuid) -> ResultEngine<Option<R>> {
        self.persistence
            .find(R::COLLECTION, id)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn count<R: Record>(&self) -> ResultEngine<u64> {
        Ok(self.persistence.count(R::COLLECTION).await?)
    }

    /// Validates `draft`, uploads `attachment` if any, then inserts the record.
    pub async fn create<R: Record>(
        &self,
        draft: R::Draft,
        attachment: Option<Attachment>,
    ) -> ResultEngine<R> {
        R::validate(&draft)?;
        let slot = Self::slot_for::<R>(attachment.as_ref())?;

        let mut row = encode(&draft)?;
        let uploaded = match (slot, attachment) {
            (Some(slot), Some(attachment)) => {
                let url = self.upload(slot, attachment).await?;
                row.insert(slot.field.to_string(), Value::String(url.clone()));
                Some(url)
            }
            (Some(slot), None) => {
                row.insert(slot.field.to_string(), Value::Null);
                None
            }
            (None, _) => None,
        };

        let stored = match self.persistence.insert(R::COLLECTION, row).await {
            Ok(stored) => stored,
            Err(err) => {
                if let Some(url) = uploaded {
                    tracing::warn!(
                        collection = %R::COLLECTION,
                        %url,
                        "insert failed after upload, object left orphaned: {err}"
                    );
                }
                return Err(err.into());
            }
        };

        let record: R = decode(stored)?;
        tracing::debug!(collection = %R::COLLECTION, id = %record.id(), "record created");
        Ok(record)
    }

    /// Overwrites every editable field of record `id` with `draft`.
    ///
    /// Without a new attachment the stored reference is kept. A replaced
    /// attachment is discarded once the row is updated; the update has
    /// happened by then, so a failed deletion is logged and the old object is
    /// left for [`RecordStore::prune_orphans`] whatever the cleanup policy.
    pub async fn update<R: Record>(
        &self,
        id: Uuid,
        draft: R::Draft,
        attachment: Option<Attachment>,
    ) -> ResultEngine<R> {
        R::validate(&draft)?;
        let slot = Self::slot_for::<R>(attachment.as_ref())?;

        let existing: R = self
            .find(id)
            .await?
            .ok_or(PersistenceError::NotFound {
                collection: R::COLLECTION,
                id,
            })?;

        let mut row = encode(&draft)?;
        let mut uploaded = None;
        let mut replaced = None;
        if let (Some(slot), Some(attachment)) = (slot, attachment) {
            let url = self.upload(slot, attachment).await?;
            row.insert(slot.field.to_string(), Value::String(url.clone()));
            replaced = existing
                .attachment()
                .filter(|old| *old != url)
                .map(|old| (slot, old.to_string()));
            uploaded = Some(url);
        }

        let stored = match self.persistence.update(R::COLLECTION, id, row).await {
            Ok(stored) => stored,
            Err(err) => {
                if let Some(url) = uploaded {
                    tracing::warn!(
                        collection = %R::COLLECTION,
                        %id,
                        %url,
                        "update failed after upload, object left orphaned: {err}"
                    );
                }
                return Err(err.into());
            }
        };
        let record: R = decode(stored)?;

        if let Some((slot, old)) = replaced {
            if let Err(err) = self.discard_attachment(slot, &old).await {
                tracing::warn!(
                    collection = %R::COLLECTION,
                    %id,
                    url = %old,
                    "replaced attachment left orphaned: {err}"
                );
            }
        }
        Ok(record)
    }

    /// Deletes record `id`, discarding its attachment first.
    pub async fn remove<R: Record>(&self, id: Uuid) -> ResultEngine<()> {
        let existing: R = self
            .find(id)
            .await?
            .ok_or(PersistenceError::NotFound {
                collection: R::COLLECTION,
                id,
            })?;

        if let (Some(slot), Some(url)) = (R::ATTACHMENT, existing.attachment()) {
            self.discard_attachment(slot, url).await?;
        }

        self.persistence.delete(R::COLLECTION, id).await?;
        tracing::debug!(collection = %R::COLLECTION, %id, "record removed");
        Ok(())
    }

    /// Objects in attachment buckets that no record references.
    pub async fn orphaned_objects(&self) -> ResultEngine<Vec<OrphanedObject>> {
        let slots = attachment_slots();

        let mut referenced = HashSet::new();
        for (collection, slot) in &slots {
            let rows = self.persistence.select(*collection, &Query::default()).await?;
            for row in rows {
                let Some(url) = column_text(&row, slot.field) else {
                    continue;
                };
                if let Ok(path) = resolve_storage_path(slot.bucket, &url) {
                    referenced.insert((slot.bucket, path));
                }
            }
        }

        let buckets: BTreeSet<&str> = slots.iter().map(|(_, slot)| slot.bucket).collect();
        let mut orphans = Vec::new();
        for bucket in buckets {
            let paths = self
                .storage
                .list(bucket)
                .await
                .map_err(EngineError::Storage)?;
            orphans.extend(
                paths
                    .into_iter()
                    .filter(|path| !referenced.contains(&(bucket, path.clone())))
                    .map(|path| OrphanedObject {
                        bucket: bucket.to_string(),
                        path,
                    }),
            );
        }
        Ok(orphans)
    }

    /// Removes every orphaned object and returns what was removed.
    pub async fn prune_orphans(&self) -> ResultEngine<Vec<OrphanedObject>> {
        let orphans = self.orphaned_objects().await?;

        let mut by_bucket: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for orphan in &orphans {
            by_bucket
                .entry(orphan.bucket.as_str())
                .or_default()
                .push(orphan.path.clone());
        }
        for (bucket, paths) in by_bucket {
            self.storage
                .remove(bucket, &paths)
                .await
                .map_err(EngineError::Storage)?;
        }

        tracing::info!(count = orphans.len(), "pruned orphaned objects");
        Ok(orphans)
    }

    /// The slot an attachment goes to, checked against the file name.
    fn slot_for<R: Record>(attachment: Option<&Attachment>) -> ResultEngine<Option<AttachmentSlot>> {
        match (R::ATTACHMENT, attachment) {
            (None, Some(_)) => Err(EngineError::Validation(format!(
                "{} do not take attachments",
                R::COLLECTION
            ))),
            (Some(slot), Some(attachment)) => {
                slot.check_filename(&attachment.filename)?;
                Ok(Some(slot))
            }
            (slot, None) => Ok(slot),
        }
    }

    async fn upload(&self, slot: AttachmentSlot, attachment: Attachment) -> ResultEngine<String> {
        let path = build_storage_path(slot.folder, &attachment.filename);
        self.storage
            .upload(
                slot.bucket,
                &path,
                attachment.bytes,
                attachment.content_type.as_deref(),
            )
            .await
            .map_err(EngineError::Upload)
    }

    /// Deletes the object behind `url`.
    ///
    /// A reference that does not point into `slot.bucket` is skipped. Storage
    /// failures are swallowed when cleanup is best effort.
    async fn discard_attachment(&self, slot: AttachmentSlot, url: &str) -> ResultEngine<()> {
        let path = match resolve_storage_path(slot.bucket, url) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(bucket = slot.bucket, "skipping attachment cleanup: {err}");
                return Ok(());
            }
        };

        match self.storage.remove(slot.bucket, &[path]).await {
            Ok(()) => Ok(()),
            Err(err) if self.best_effort_cleanup => {
                tracing::warn!(bucket = slot.bucket, %url, "attachment cleanup failed: {err}");
                Ok(())
            }
            Err(err) => Err(EngineError::Storage(err)),
        }
    }
}

pub struct RecordStoreBuilder {
    persistence: Option<Arc<dyn Persistence>>,
    storage: Option<Arc<dyn ObjectStorage>>,
    best_effort_cleanup: bool,
}

impl Default for RecordStoreBuilder {
    fn default() -> Self {
        Self {
            persistence: None,
            storage: None,
            best_effort_cleanup: true,
        }
    }
}

impl RecordStoreBuilder {
    /// Pass the required collection store
    pub fn persistence(mut self, persistence: Arc<dyn Persistence>) -> RecordStoreBuilder {
        self.persistence = Some(persistence);
        self
    }

    /// Pass the required object store
    pub fn storage(mut self, storage: Arc<dyn ObjectStorage>) -> RecordStoreBuilder {
        self.storage = Some(storage);
        self
    }

    /// When `false`, a failed attachment deletion aborts the operation.
    pub fn best_effort_cleanup(mut self, best_effort: bool) -> RecordStoreBuilder {
        self.best_effort_cleanup = best_effort;
        self
    }

    /// Construct `RecordStore`
    pub fn build(self) -> ResultEngine<RecordStore> {
        let persistence = self
            .persistence
            .ok_or_else(|| EngineError::InvalidConfig("missing persistence".to_string()))?;
        let storage = self
            .storage
            .ok_or_else(|| EngineError::InvalidConfig("missing object storage".to_string()))?;
        Ok(RecordStore {
            persistence,
            storage,
            best_effort_cleanup: self.best_effort_cleanup,
        })
    }
}
