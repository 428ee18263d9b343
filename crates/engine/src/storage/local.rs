use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};

use crate::{StorageError, attachments};

use super::{ObjectStorage, ResultStorage, check_path};

/// [`ObjectStorage`] keeping every bucket as a directory under `root`.
///
/// Public URLs are `{public_base_url}/storage/v1/object/public/{bucket}/{path}`;
/// the HTTP server serves `root` under that prefix.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> ResultStorage<PathBuf> {
        if bucket.contains('/') {
            return Err(StorageError::InvalidPath(bucket.to_string()));
        }
        check_path(bucket)?;
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, path: &str) -> ResultStorage<PathBuf> {
        check_path(path)?;
        Ok(self.bucket_dir(bucket)?.join(path))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> ResultStorage<String> {
        let target = self.object_path(bucket, path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(path.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        file.write_all(&bytes).await?;
        file.flush().await?;

        Ok(attachments::public_url(&self.public_base_url, bucket, path))
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> ResultStorage<()> {
        for path in paths {
            let target = self.object_path(bucket, path)?;
            match fs::remove_file(&target).await {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    async fn list(&self, bucket: &str) -> ResultStorage<Vec<String>> {
        let base = self.bucket_dir(bucket)?;
        let mut found = Vec::new();
        let mut pending = vec![base.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }
                if let Ok(relative) = path.strip_prefix(&base) {
                    let parts: Vec<_> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect();
                    found.push(parts.join("/"));
                }
            }
        }

        found.sort();
        Ok(found)
    }
}
