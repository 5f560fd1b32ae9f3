//! Local preview references
//!
//! A preview is an in-process reference to the selected file's bytes, never a
//! network resource. Each reference must be revoked explicitly before the form
//! assigns a new one; the registry tracks which references are still live.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use uuid::Uuid;

use super::SelectedFile;

const PREVIEW_SCHEME: &str = "blob:crowdcatch/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRef {
    id: Uuid,
    url: String,
}

impl PreviewRef {
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone)]
struct PreviewEntry {
    content_type: String,
    data: Bytes,
}

/// Registry of live previews. Clones share the same registry.
#[derive(Debug, Default, Clone)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashMap<Uuid, PreviewEntry>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, file: &SelectedFile) -> PreviewRef {
        let id = Uuid::new_v4();
        self.entries().insert(
            id,
            PreviewEntry {
                content_type: file.content_type.clone(),
                data: file.data.clone(),
            },
        );
        PreviewRef {
            id,
            url: format!("{}{}", PREVIEW_SCHEME, id),
        }
    }

    /// Returns false if the reference was already revoked.
    pub fn revoke(&self, preview: &PreviewRef) -> bool {
        self.entries().remove(&preview.id).is_some()
    }

    /// Content type and bytes behind a live preview.
    pub fn resolve(&self, preview: &PreviewRef) -> Option<(String, Bytes)> {
        self.entries()
            .get(&preview.id)
            .map(|e| (e.content_type.clone(), e.data.clone()))
    }

    pub fn is_live(&self, preview: &PreviewRef) -> bool {
        self.entries().contains_key(&preview.id)
    }

    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, PreviewEntry>> {
        self.live.lock().unwrap_or_else(|e| e.into_inner())
    }
}
