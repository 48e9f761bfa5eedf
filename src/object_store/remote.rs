use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use super::{ObjectStore, ObjectStoreError};

/// Hosted object-storage backend speaking a Supabase-style storage REST API.
/// Authenticates with a service key; uploads use upsert semantics and carry
/// a short cache-control hint.
pub struct RemoteStore {
    api_url: String,
    bucket: String,
    client: Client,
    service_key: String,
}

impl RemoteStore {
    pub fn new(api_url: &str, bucket: &str, service_key: &str) -> Result<Self, anyhow::Error> {
        let client = Client::builder().build()?;
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            client,
            service_key: service_key.to_string(),
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/object/{}/{}", self.api_url, self.bucket, path)
    }

    fn info_url(&self, path: &str) -> String {
        format!("{}/object/info/{}/{}", self.api_url, self.bucket, path)
    }

    /// Distinguish a missing bucket from other failures so the admin
    /// workflow can surface the named remediation.
    fn classify_failure(&self, status: reqwest::StatusCode, body: &str) -> ObjectStoreError {
        if status == reqwest::StatusCode::NOT_FOUND
            && body.to_lowercase().contains("bucket not found")
        {
            return ObjectStoreError::BucketNotFound(self.bucket.clone());
        }
        ObjectStoreError::Backend(format!("storage request failed ({status}): {body}"))
    }
}

#[async_trait]
impl ObjectStore for RemoteStore {
    async fn put(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let resp = self
            .client
            .post(self.object_url(path))
            .bearer_auth(&self.service_key)
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .header("Cache-Control", "max-age=3600")
            .body(data)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(self.classify_failure(status, &body));
        }

        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Bytes, ObjectStoreError> {
        let resp = self
            .client
            .get(self.object_url(path))
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ObjectStoreError::NotFound(path.to_string()));
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(self.classify_failure(status, &body));
        }

        let data = resp
            .bytes()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        Ok(data)
    }

    async fn delete(&self, path: &str) -> Result<(), ObjectStoreError> {
        let resp = self
            .client
            .delete(self.object_url(path))
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        // 404 is fine -- object already gone
        if !resp.status().is_success() && resp.status() != reqwest::StatusCode::NOT_FOUND {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(self.classify_failure(status, &body));
        }

        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, ObjectStoreError> {
        let resp = self
            .client
            .get(self.info_url(path))
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        Ok(resp.status().is_success())
    }
}
