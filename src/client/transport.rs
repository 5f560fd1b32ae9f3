// HTTP transport from the form to the relay

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use super::SelectedFile;
use crate::models::UploadResponse;
use crate::routes::upload::IMAGE_FIELD;

pub const DEFAULT_UPLOAD_ENDPOINT: &str = "http://localhost:8000/api/upload";

/// Transport errors. The form logs these and shows a generic message.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload failed with status {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Sends one file to the relay. One call is one request; no retries.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn send(&self, file: &SelectedFile) -> Result<UploadResponse, TransportError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_ENDPOINT)
    }
}

#[async_trait]
impl UploadTransport for HttpTransport {
    async fn send(&self, file: &SelectedFile) -> Result<UploadResponse, TransportError> {
        let part = Part::bytes(file.data.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| TransportError::InvalidFile(e.to_string()))?;
        let form = Form::new().part(IMAGE_FIELD, part);

        debug!(endpoint = %self.endpoint, file = %file.name, "Posting upload");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::AppState;
    use crate::routes::create_router;
    use crate::storage::keys::FixedClock;
    use crate::storage::MemoryStore;
    use bytes::Bytes;
    use mockito::Matcher;
    use std::sync::Arc;

    fn sunset() -> SelectedFile {
        SelectedFile::new("sunset.png", "image/png", Bytes::from_static(b"not really a png"))
    }

    #[tokio::test]
    async fn test_posts_single_image_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/upload")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="image"; filename="sunset.png""#.to_string()),
                Matcher::Regex("Content-Type: image/png".to_string()),
                Matcher::Regex("not really a png".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"message":"File uploaded successfully!","key":"1-sunset.png"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(format!("{}/api/upload", server.url()));
        let result = transport.send(&sunset()).await.unwrap();

        assert_eq!(result.key.as_deref(), Some("1-sunset.png"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/upload")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":false,"message":"S3 bucket name is not configured."}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(format!("{}/api/upload", server.url()));
        let err = transport.send(&sunset()).await.unwrap_err();

        assert!(matches!(err, TransportError::Status(500)));
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(format!("http://{}/api/upload", addr));
        let err = transport.send(&sunset()).await.unwrap_err();

        assert!(matches!(err, TransportError::Network(_)));
    }

    #[tokio::test]
    async fn test_bytes_and_content_type_reach_storage_unchanged() {
        let mut config = Config::default();
        config.storage.provider = "memory".to_string();
        config.storage.s3_bucket = Some("crowdcatch-assets".to_string());
        let store = MemoryStore::new();
        let state = AppState::new(config, Arc::new(store.clone()))
            .with_clock(Arc::new(FixedClock(1_700_000_000_000)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });

        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let file = SelectedFile::new("sunset.png", "image/png", Bytes::from(data.clone()));
        let transport = HttpTransport::new(format!("http://{}/api/upload", addr));

        let result = transport.send(&file).await.unwrap();
        assert_eq!(result.key.as_deref(), Some("1700000000000-sunset.png"));

        let stored = store
            .get("crowdcatch-assets", "1700000000000-sunset.png")
            .unwrap();
        assert_eq!(stored.body.as_ref(), data.as_slice());
        assert_eq!(stored.content_type, "image/png");
    }
}
