use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};

use super::{ObjectStore, ObjectStoreError};

/// Local filesystem object store for development and testing.
/// Objects live under `{base}/{bucket}/{path}`.
pub struct LocalStore {
    bucket_path: PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(base_path: P, bucket: &str) -> Result<Self, std::io::Error> {
        let bucket_path = base_path.as_ref().join(bucket);
        std::fs::create_dir_all(&bucket_path)?;
        Ok(Self { bucket_path })
    }

    /// Resolve an object key to a filesystem path. Keys must stay inside the
    /// bucket: any `..`, root, or prefix component is rejected so a caller
    /// cannot escape to arbitrary files.
    fn object_path(&self, path: &str) -> Result<PathBuf, ObjectStoreError> {
        let clean = Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !clean || path.is_empty() {
            return Err(ObjectStoreError::Backend(format!(
                "invalid object path: {path}"
            )));
        }
        Ok(self.bucket_path.join(path))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(
        &self,
        path: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let full_path = self.object_path(path)?;
        if !self.bucket_path.exists() {
            return Err(ObjectStoreError::BucketNotFound(
                self.bucket_path.to_string_lossy().to_string(),
            ));
        }
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, &data).await?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Bytes, ObjectStoreError> {
        let full_path = self.object_path(path)?;
        if !full_path.exists() {
            return Err(ObjectStoreError::NotFound(path.to_string()));
        }
        let data = tokio::fs::read(&full_path).await?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, path: &str) -> Result<(), ObjectStoreError> {
        let full_path = self.object_path(path)?;
        if full_path.exists() {
            tokio::fs::remove_file(&full_path).await?;
        }
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, ObjectStoreError> {
        Ok(self.object_path(path)?.exists())
    }
}
