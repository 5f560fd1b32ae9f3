//! `POST /api/upload`
//!
//! Accepts a multipart form with one file part named `image`, buffers it in
//! memory and writes it to the configured bucket under
//! `<epoch-millis>-<original filename>`.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{error, info, warn};

use crate::models::{AppState, UploadResponse};
use crate::storage::{ObjectKey, PutObject};
use crate::types::{RelayError, RelayResult};

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

pub fn router(state: AppState) -> Router {
    let body_limit = match state.config.upload.max_upload_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/api/upload", post(upload_image))
        .layer(body_limit)
        .with_state(state)
}

/// A file part read fully into memory.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> RelayResult<Json<UploadResponse>> {
    let multipart = multipart.map_err(|e| {
        warn!("Upload request is not a readable multipart body: {}", e);
        RelayError::NoFile
    })?;

    let file = extract_image_file(multipart)
        .await?
        .ok_or(RelayError::NoFile)?;

    let bucket = state
        .config
        .storage
        .bucket()
        .ok_or_else(|| {
            error!("Upload rejected: S3_BUCKET_NAME is not set");
            RelayError::BucketNotConfigured
        })?
        .to_string();

    let key = ObjectKey::generate(
        state.clock.as_ref(),
        &file.filename,
        state.config.upload.unique_keys,
    );

    info!(
        key = %key,
        content_type = %file.content_type,
        size = file.data.len(),
        "Uploading file to object storage"
    );

    state
        .store
        .put_object(PutObject {
            bucket,
            key: key.to_string(),
            content_type: file.content_type,
            body: file.data,
        })
        .await
        .map_err(|e| {
            error!(key = %key, "Error uploading file to S3: {}", e);
            RelayError::Storage(e)
        })?;

    Ok(Json(UploadResponse::uploaded(key.into_string())))
}

/// Pull the first file part named `image` out of the form.
///
/// Other fields are skipped. A body that breaks mid-stream counts as no file,
/// except when it tripped the configured size limit.
pub async fn extract_image_file(mut multipart: Multipart) -> RelayResult<Option<UploadedFile>> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Failed to read multipart field: {}", e);
                return Err(body_error(e.status()));
            }
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
            .to_string();

        let data = field.bytes().await.map_err(|e| {
            warn!(filename = %filename, "Failed to read file data: {}", e);
            body_error(e.status())
        })?;

        return Ok(Some(UploadedFile {
            filename,
            content_type,
            data,
        }));
    }
}

fn body_error(status: StatusCode) -> RelayError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::TooLarge
    } else {
        RelayError::NoFile
    }
}
