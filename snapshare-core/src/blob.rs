//! Process-local image bytes behind `blob:` references.
//!
//! Registered bytes live exactly as long as the registry (in practice the
//! process). Nothing here is written to storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::constants::BLOB_ORIGIN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Arc<[u8]>,
    pub mime_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
    blobs: Arc<RwLock<HashMap<String, Blob>>>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `bytes` reachable under a fresh `blob:` URL.
    pub fn register(&self, bytes: impl Into<Arc<[u8]>>, mime_type: &str) -> String {
        let url = format!("blob:{}/{}", BLOB_ORIGIN, Uuid::new_v4());
        let blob = Blob {
            bytes: bytes.into(),
            mime_type: mime_type.to_string(),
        };
        self.blobs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(url.clone(), blob);
        url
    }

    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.blobs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(url)
            .cloned()
    }

    /// Returns whether the URL was registered.
    pub fn revoke(&self, url: &str) -> bool {
        self.blobs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(url)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.blobs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
