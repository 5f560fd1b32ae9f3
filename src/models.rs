use std::sync::Arc;

use crate::config::Config;
use crate::storage::{Clock, ObjectStore, SystemClock};

/// Shared relay state. Cloned per request; everything behind it is read-only.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ObjectStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            config,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Upload result, shared by the relay (serializes it) and the client form
/// (parses it from a 2xx body).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn uploaded(key: impl Into<String>) -> Self {
        Self {
            success: true,
            message: "File uploaded successfully!".to_string(),
            key: Some(key.into()),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            key: None,
            error,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub storage: String,
    pub bucket_configured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_omits_absent_fields() {
        let json = serde_json::to_value(UploadResponse::failure("No file provided.", None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "message": "No file provided."})
        );
    }

    #[test]
    fn test_parse_success_body() {
        let body = r#"{"success":true,"message":"File uploaded successfully!","key":"1-a.png"}"#;
        let parsed: UploadResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed, UploadResponse::uploaded("1-a.png"));
    }
}
