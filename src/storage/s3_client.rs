// S3 backend built on rust-s3

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::region::Region;
use s3::Bucket;
use tracing::{debug, warn};

use super::{ObjectStore, PutObject, StorageError, StorageResult};
use crate::config::StorageConfig;

/// Long-lived S3 client. Region and credentials are resolved once; the bucket
/// handle is built per write because the bucket name comes with each request.
#[derive(Clone)]
pub struct S3Client {
    region: Region,
    credentials: Credentials,
    path_style: bool,
}

impl S3Client {
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        let region = match &config.s3_endpoint {
            Some(endpoint) => Region::Custom {
                region: config.s3_region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .s3_region
                .parse()
                .map_err(|e| StorageError::ConfigError(format!("invalid region: {}", e)))?,
        };

        // Without explicit keys rust-s3 falls back to env, profile and instance metadata.
        let credentials = match Credentials::new(
            config.s3_access_key_id.as_deref(),
            config.s3_secret_access_key.as_deref(),
            None,
            None,
            None,
        ) {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!("No S3 credentials resolved, requests will be unsigned: {}", e);
                Credentials::anonymous()
                    .map_err(|e| StorageError::ConfigError(format!("invalid credentials: {}", e)))?
            }
        };

        Ok(Self {
            region,
            credentials,
            path_style: config.s3_endpoint.is_some(),
        })
    }

    fn bucket(&self, name: &str) -> StorageResult<Bucket> {
        let bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        if self.path_style {
            Ok(bucket.with_path_style())
        } else {
            Ok(bucket)
        }
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_object(&self, object: PutObject) -> StorageResult<()> {
        let bucket = self.bucket(&object.bucket)?;

        let response = bucket
            .put_object_with_content_type(&object.key, &object.body, &object.content_type)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::UploadFailed(format!(
                "S3 responded with status {}",
                status
            )));
        }

        debug!(bucket = %object.bucket, key = %object.key, size = object.body.len(), "Object written");
        Ok(())
    }

    fn provider(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_custom_endpoint_uses_path_style() {
        let mut config = Config::default();
        config.storage.s3_endpoint = Some("http://localhost:9000".to_string());
        config.storage.s3_access_key_id = Some("minio".to_string());
        config.storage.s3_secret_access_key = Some("minio123".to_string());

        let client = S3Client::new(&config.storage).unwrap();
        assert!(client.path_style);
        assert!(matches!(client.region, Region::Custom { .. }));
    }

    #[test]
    fn test_named_region() {
        let mut config = Config::default();
        config.storage.s3_region = "eu-west-1".to_string();
        config.storage.s3_access_key_id = Some("AKIAEXAMPLE".to_string());
        config.storage.s3_secret_access_key = Some("secret".to_string());

        let client = S3Client::new(&config.storage).unwrap();
        assert!(!client.path_style);
        assert!(matches!(client.region, Region::EuWest1));
    }

    #[test]
    fn test_bucket_handle_per_name() {
        let mut config = Config::default();
        config.storage.s3_endpoint = Some("http://localhost:9000".to_string());
        config.storage.s3_access_key_id = Some("minio".to_string());
        config.storage.s3_secret_access_key = Some("minio123".to_string());

        let client = S3Client::new(&config.storage).unwrap();
        let bucket: Bucket = client.bucket("crowdcatch-assets").unwrap();

        assert_eq!(bucket.name(), "crowdcatch-assets");
        assert!(bucket.is_path_style());
    }
}
