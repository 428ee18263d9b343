use std::{
    collections::{BTreeMap, HashMap},
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{StorageError, attachments};

use super::{ObjectStorage, ResultStorage, check_path};

/// In-process [`ObjectStorage`].
///
/// Uploads and removals can be made to fail on demand, which is how the
/// record workflows are exercised against an unavailable storage service.
#[derive(Debug)]
pub struct MemoryObjectStorage {
    public_base_url: String,
    objects: RwLock<HashMap<String, BTreeMap<String, Vec<u8>>>>,
    fail_uploads: AtomicBool,
    fail_removals: AtomicBool,
}

impl Default for MemoryObjectStorage {
    fn default() -> Self {
        Self::new("http://localhost")
    }
}

impl MemoryObjectStorage {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
            objects: RwLock::default(),
            fail_uploads: AtomicBool::new(false),
            fail_removals: AtomicBool::new(false),
        }
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }

    /// Content of a stored object.
    pub async fn get(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(bucket)
            .and_then(|objects| objects.get(path))
            .cloned()
    }

    /// Number of objects across every bucket.
    pub async fn len(&self) -> usize {
        self.objects.read().await.values().map(BTreeMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> ResultStorage<String> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected("storage unavailable".to_string()));
        }
        check_path(path)?;

        let mut objects = self.objects.write().await;
        let bucket_objects = objects.entry(bucket.to_string()).or_default();
        if bucket_objects.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        bucket_objects.insert(path.to_string(), bytes);

        Ok(attachments::public_url(&self.public_base_url, bucket, path))
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> ResultStorage<()> {
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected("storage unavailable".to_string()));
        }

        let mut objects = self.objects.write().await;
        if let Some(bucket_objects) = objects.get_mut(bucket) {
            for path in paths {
                bucket_objects.remove(path);
            }
        }
        Ok(())
    }

    async fn list(&self, bucket: &str) -> ResultStorage<Vec<String>> {
        Ok(self
            .objects
            .read()
            .await
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default())
    }
}
