//! Object storage layer
//!
//! The relay only ever writes: one `put_object` per upload. Backends are
//! selected by `STORAGE_PROVIDER`:
//! - `s3` - any S3-compatible service via `rust-s3`
//! - `memory` - process-local map, used for local runs and tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;

use crate::config::StorageConfig;

pub mod keys;
pub mod s3_client;

pub use keys::{Clock, ObjectKey, SystemClock};
pub use s3_client::S3Client;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    UploadFailed(String),

    #[error("Storage configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown storage provider: {0}")]
    UnknownProvider(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A single object write.
#[derive(Debug, Clone)]
pub struct PutObject {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Write side of an object store.
///
/// Implementations must be safe to share across concurrent requests; the relay
/// holds a single instance for the lifetime of the process.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, object: PutObject) -> StorageResult<()>;

    /// Short provider name reported by the health endpoint.
    fn provider(&self) -> &'static str;
}

/// In-memory store keyed by `(bucket, key)`.
///
/// Later writes to the same key overwrite earlier ones, the same way S3 does.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    objects: Arc<Mutex<HashMap<(String, String), PutObject>>>,
    writes: Arc<Mutex<Vec<PutObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<PutObject> {
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects.get(&(bucket.to_string(), key.to_string())).cloned()
    }

    /// Every write received, in arrival order.
    pub fn writes(&self) -> Vec<PutObject> {
        self.writes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, object: PutObject) -> StorageResult<()> {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(object.clone());
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((object.bucket.clone(), object.key.clone()), object);
        Ok(())
    }

    fn provider(&self) -> &'static str {
        "memory"
    }
}

/// Build the configured backend.
pub fn build_store(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    match config.provider.as_str() {
        "s3" => {
            info!(region = %config.s3_region, endpoint = ?config.s3_endpoint, "Using S3 storage");
            Ok(Arc::new(S3Client::new(config)?))
        }
        "memory" => {
            info!("Using in-memory storage");
            Ok(Arc::new(MemoryStore::new()))
        }
        other => Err(StorageError::UnknownProvider(other.to_string())),
    }
}
