use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origin: String,
}

#[derive(Clone)]
pub struct StorageConfig {
    pub provider: String,
    pub s3_bucket: Option<String>,
    pub s3_region: String,
    pub s3_access_key_id: Option<String>,
    pub s3_secret_access_key: Option<String>,
    pub s3_endpoint: Option<String>,
}

// Credentials stay out of the startup log line.
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("provider", &self.provider)
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_region", &self.s3_region)
            .field("s3_access_key_id", &self.s3_access_key_id.as_ref().map(|_| "***"))
            .field("s3_secret_access_key", &self.s3_secret_access_key.as_ref().map(|_| "***"))
            .field("s3_endpoint", &self.s3_endpoint)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Insert a random token between the timestamp and the filename.
    pub unique_keys: bool,
    /// Request body cap in bytes; `None` leaves uploads unbounded.
    pub max_upload_bytes: Option<usize>,
}

impl StorageConfig {
    /// Bucket name, treating an empty value as unset.
    pub fn bucket(&self) -> Option<&str> {
        self.s3_bucket.as_deref().filter(|b| !b.trim().is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 8000,
                host: "0.0.0.0".to_string(),
                cors_allowed_origin: "http://localhost:3000".to_string(),
            },
            storage: StorageConfig {
                provider: "s3".to_string(),
                s3_bucket: None,
                s3_region: "us-east-1".to_string(),
                s3_access_key_id: None,
                s3_secret_access_key: None,
                s3_endpoint: None,
            },
            upload: UploadConfig {
                unique_keys: false,
                max_upload_bytes: None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origin: env::var("ALLOWED_ORIGIN")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
            storage: StorageConfig {
                provider: env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "s3".to_string()),
                s3_bucket: env::var("S3_BUCKET_NAME").ok(),
                s3_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                s3_access_key_id: env::var("AWS_ACCESS_KEY_ID").ok(),
                s3_secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
                s3_endpoint: env::var("S3_ENDPOINT").ok(),
            },
            upload: UploadConfig {
                unique_keys: env::var("UNIQUE_OBJECT_KEYS")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse::<bool>()
                    .context("UNIQUE_OBJECT_KEYS must be true or false")?,
                max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .map(|v| v.parse::<usize>())
                    .transpose()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
            },
        })
    }
}
