mod local;
mod remote;

pub use local::LocalStore;
pub use remote::RemoteStore;

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Abstraction over object storage backends.
///
/// Keys are bucket-relative paths like `covers/1712_poster.png`. `put` has
/// upsert semantics: writing an existing path overwrites it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, path: &str, data: Bytes, content_type: &str)
        -> Result<(), ObjectStoreError>;
    async fn get(&self, path: &str) -> Result<Bytes, ObjectStoreError>;
    async fn delete(&self, path: &str) -> Result<(), ObjectStoreError>;
    async fn exists(&self, path: &str) -> Result<bool, ObjectStoreError>;
}

/// Build the bucket-relative upload path for a new object.
///
/// The timestamp prefix is the sole collision-avoidance strategy; two uploads
/// in the same millisecond with the same filename collide (accepted risk).
pub fn upload_path(prefix: &str, timestamp_millis: i64, filename: &str) -> String {
    format!("{prefix}/{timestamp_millis}_{filename}")
}

/// The storage surface the admin workflow and serving routes talk to: one
/// named bucket on a swappable backend, plus URL construction.
pub struct StorageGateway {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    public_base_url: String,
    signing_key: Option<String>,
}

impl StorageGateway {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
        signing_key: Option<String>,
    ) -> Self {
        let public_base_url = public_base_url.into();
        Self {
            store,
            bucket: bucket.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            signing_key,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload bytes to the bucket at `path`, overwriting if present.
    /// Returns the stored path; errors come back as values, never panics.
    pub async fn upload_file(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, ObjectStoreError> {
        self.store.put(path, data, content_type).await?;
        Ok(path.to_string())
    }

    pub async fn delete_file(&self, path: &str) -> Result<(), ObjectStoreError> {
        self.store.delete(path).await
    }

    pub async fn fetch(&self, path: &str) -> Result<Bytes, ObjectStoreError> {
        self.store.get(path).await
    }

    pub async fn exists(&self, path: &str) -> Result<bool, ObjectStoreError> {
        self.store.exists(path).await
    }

    /// Deterministic public URL for a stored path. No network call; assumes
    /// the bucket is publicly readable.
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/storage/{}/{}", self.public_base_url, self.bucket, path)
    }

    /// Time-limited URL for private-bucket use. Returns `None` when no
    /// signing key is configured (failure is non-fatal by contract).
    pub fn signed_url(&self, path: &str, expires_in_secs: i64) -> Option<String> {
        let Some(ref key) = self.signing_key else {
            tracing::error!(path, "Cannot sign URL: no signing key configured");
            return None;
        };

        let expires = chrono::Utc::now().timestamp() + expires_in_secs;
        let token = sign(key, path, expires);
        Some(format!(
            "{}/storage/{}/{}?token={}&expires={}",
            self.public_base_url, self.bucket, path, token, expires
        ))
    }

    /// Verify a signed-URL token for `path`. Rejects expired or forged tokens.
    pub fn verify_signed(&self, path: &str, token: &str, expires: i64) -> bool {
        let Some(ref key) = self.signing_key else {
            return false;
        };
        if expires <= chrono::Utc::now().timestamp() {
            return false;
        }

        let Ok(tag) = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(token) else {
            return false;
        };
        let hmac_key = ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key.as_bytes());
        ring::hmac::verify(&hmac_key, format!("{path}:{expires}").as_bytes(), &tag).is_ok()
    }
}

fn sign(key: &str, path: &str, expires: i64) -> String {
    let hmac_key = ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key.as_bytes());
    let tag = ring::hmac::sign(&hmac_key, format!("{path}:{expires}").as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(tag.as_ref())
}
