// Error types for the relay

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::UploadResponse;
use crate::storage::StorageError;

/// Terminal outcomes of `POST /api/upload` other than success.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("No file provided.")]
    NoFile,

    #[error("File exceeds the upload size limit.")]
    TooLarge,

    #[error("S3 bucket name is not configured.")]
    BucketNotConfigured,

    #[error("Failed to upload file.")]
    Storage(#[from] StorageError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::NoFile => StatusCode::BAD_REQUEST,
            RelayError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::BucketNotConfigured | RelayError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let detail = match &self {
            RelayError::Storage(e) => Some(e.to_string()),
            _ => None,
        };
        let body = UploadResponse::failure(self.to_string(), detail);
        (self.status(), Json(body)).into_response()
    }
}

pub type RelayResult<T> = std::result::Result<T, RelayError>;
