//! Upload form
//!
//! Client side of the pipeline as an explicit state machine:
//!
//! ```text
//! Empty -> FileSelected -> Uploading -> Succeeded | Failed
//!               ^                            |
//!               +------- new selection ------+
//! ```
//!
//! Selecting a file never touches the network. Uploading is an explicit
//! action, and `Uploading` guards against a second submit until the first
//! settles. The form owns the selected file and its preview reference; the
//! previous preview is revoked before a new one is assigned.

pub mod preview;
pub mod transport;

use std::path::Path;

use bytes::Bytes;
use tracing::{debug, error, info};

use crate::models::UploadResponse;

pub use preview::{PreviewRef, PreviewRegistry};
pub use transport::{HttpTransport, TransportError, UploadTransport, DEFAULT_UPLOAD_ENDPOINT};

pub const SUCCESS_MESSAGE: &str = "Image uploaded successfully!";
pub const FAILURE_MESSAGE: &str = "Failed to upload image. Please try again.";
pub const NO_FILE_MESSAGE: &str = "Please select a file before uploading.";

/// A file picked or dropped by the user, held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self::new(name, content_type, Bytes::from(data)))
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Empty,
    FileSelected,
    Uploading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub text: String,
    pub is_error: bool,
}

impl FormMessage {
    fn info(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_error: false,
        }
    }

    fn error(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_error: true,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("no file selected")]
    NoFileSelected,

    #[error("an upload is already in progress")]
    UploadInFlight,

    #[error("no upload is in progress")]
    NotUploading,

    #[error("upload failed")]
    UploadFailed,
}

pub struct UploadForm {
    state: FormState,
    file: Option<SelectedFile>,
    preview: Option<PreviewRef>,
    previews: PreviewRegistry,
    message: Option<FormMessage>,
    last_result: Option<UploadResponse>,
    drag_active: bool,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::with_registry(PreviewRegistry::new())
    }

    pub fn with_registry(previews: PreviewRegistry) -> Self {
        Self {
            state: FormState::Empty,
            file: None,
            preview: None,
            previews,
            message: None,
            last_result: None,
            drag_active: false,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewRef> {
        self.preview.as_ref()
    }

    pub fn message(&self) -> Option<&FormMessage> {
        self.message.as_ref()
    }

    pub fn last_result(&self) -> Option<&UploadResponse> {
        self.last_result.as_ref()
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    /// Whether the upload button is enabled.
    pub fn can_upload(&self) -> bool {
        self.file.is_some() && self.state != FormState::Uploading
    }

    /// File picker selection.
    pub fn select(&mut self, file: SelectedFile) -> Result<(), FormError> {
        self.ensure_idle()?;
        self.release_preview();

        debug!(file = %file.name, size = file.size(), "File selected");
        self.preview = Some(self.previews.create(&file));
        self.file = Some(file);
        self.message = None;
        self.last_result = None;
        self.state = FormState::FileSelected;
        Ok(())
    }

    /// Drop onto the target. Only the first file is used.
    pub fn drop_files(&mut self, files: Vec<SelectedFile>) -> Result<(), FormError> {
        self.drag_active = false;
        match files.into_iter().next() {
            Some(file) => self.select(file),
            None => self.clear(),
        }
    }

    /// Forget the current file, e.g. a picker closed with nothing chosen.
    /// Any message stays visible.
    pub fn clear(&mut self) -> Result<(), FormError> {
        self.ensure_idle()?;
        self.release_preview();
        self.file = None;
        self.state = FormState::Empty;
        Ok(())
    }

    pub fn drag_enter(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_active = false;
    }

    /// Enter `Uploading` and hand out the file to send.
    ///
    /// Without a file this fails locally and sets the validation message.
    pub fn begin_upload(&mut self) -> Result<SelectedFile, FormError> {
        self.ensure_idle()?;

        let Some(file) = self.file.clone() else {
            self.message = Some(FormMessage::error(NO_FILE_MESSAGE));
            return Err(FormError::NoFileSelected);
        };

        self.message = None;
        self.state = FormState::Uploading;
        Ok(file)
    }

    /// Settle the in-flight upload with the transport outcome.
    pub fn settle(
        &mut self,
        outcome: Result<UploadResponse, TransportError>,
    ) -> Result<UploadResponse, FormError> {
        if self.state != FormState::Uploading {
            return Err(FormError::NotUploading);
        }

        match outcome {
            Ok(response) => {
                info!(key = ?response.key, "Upload succeeded");
                self.state = FormState::Succeeded;
                self.message = Some(FormMessage::info(SUCCESS_MESSAGE));
                self.last_result = Some(response.clone());
                Ok(response)
            }
            Err(e) => {
                error!("Error uploading file: {}", e);
                self.state = FormState::Failed;
                self.message = Some(FormMessage::error(FAILURE_MESSAGE));
                self.last_result = None;
                Err(FormError::UploadFailed)
            }
        }
    }

    /// Upload the selected file: exactly one request, no retry.
    pub async fn upload(
        &mut self,
        transport: &dyn UploadTransport,
    ) -> Result<UploadResponse, FormError> {
        let file = self.begin_upload()?;
        let outcome = transport.send(&file).await;
        self.settle(outcome)
    }

    fn ensure_idle(&self) -> Result<(), FormError> {
        if self.state == FormState::Uploading {
            Err(FormError::UploadInFlight)
        } else {
            Ok(())
        }
    }

    fn release_preview(&mut self) {
        if let Some(preview) = self.preview.take() {
            self.previews.revoke(&preview);
        }
    }
}

impl Default for UploadForm {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for UploadForm {
    fn drop(&mut self) {
        self.release_preview();
    }
}
