use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub data_dir: String,
    pub storage: StorageConfig,
    /// Session lifetime in seconds
    pub session_ttl_secs: i64,
    /// Enables dangerous operations like purge. Must never be true in production.
    pub test_mode: bool,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Local,
    Remote,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Bucket holding every uploaded object
    pub bucket: String,
    /// Base URL prefixed to public object URLs
    pub public_base_url: String,
    /// Directory for the local storage backend
    pub local_storage_path: String,
    /// Storage API endpoint (required when backend is remote)
    pub remote_api_url: Option<String>,
    /// Service key for the remote storage API
    pub remote_service_key: Option<String>,
    /// HMAC key for signed URLs (optional; unset disables signing)
    pub url_signing_key: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            bucket: "content-files".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
            local_storage_path: "./files".to_string(),
            remote_api_url: None,
            remote_service_key: None,
            url_signing_key: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let session_ttl_secs = std::env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(7 * 24 * 3600);

        let test_mode = std::env::var("TEST_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(500 * 1024 * 1024); // 500MB

        let storage_backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "remote" => StorageBackend::Remote,
            _ => StorageBackend::Local,
        };

        let bucket =
            std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "content-files".to_string());

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{bind_address}"));

        let local_storage_path =
            std::env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./files".to_string());

        let config = Config {
            bind_address,
            data_dir,
            storage: StorageConfig {
                backend: storage_backend,
                bucket,
                public_base_url,
                local_storage_path,
                remote_api_url: std::env::var("STORAGE_API_URL").ok(),
                remote_service_key: std::env::var("STORAGE_SERVICE_KEY").ok(),
                url_signing_key: std::env::var("URL_SIGNING_KEY").ok(),
            },
            session_ttl_secs,
            test_mode,
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.bucket.is_empty() {
            return Err(ConfigError::ValidationError(
                "STORAGE_BUCKET cannot be empty".to_string(),
            ));
        }

        if matches!(self.storage.backend, StorageBackend::Remote) {
            if self.storage.remote_api_url.is_none() {
                return Err(ConfigError::ValidationError(
                    "STORAGE_API_URL is required when STORAGE_BACKEND=remote".to_string(),
                ));
            }
            if self.storage.remote_service_key.is_none() {
                return Err(ConfigError::ValidationError(
                    "STORAGE_SERVICE_KEY is required when STORAGE_BACKEND=remote".to_string(),
                ));
            }
        }

        if self.session_ttl_secs <= 0 {
            return Err(ConfigError::ValidationError(
                "SESSION_TTL_SECS must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
