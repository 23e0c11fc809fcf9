//! Turning uploaded files into photo records on an event.
//!
//! Photos are appended and saved one at a time, so when a batch fails
//! part-way the photos written before the failure stay in the store.

use tracing::{debug, info, warn};

use crate::blob::BlobRegistry;
use crate::error::SnapError;
use crate::event::Photo;
use crate::store::EventStore;

/// One file handed in by a participant.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub name: String,
    pub size: u64,
    /// Declared MIME type, as reported by whoever supplied the file.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageInput {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        ImageInput {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Stored(Photo),
    /// Not an image; dropped without error.
    Skipped { name: String, mime_type: String },
}

impl IngestOutcome {
    pub fn photo(&self) -> Option<&Photo> {
        match self {
            IngestOutcome::Stored(photo) => Some(photo),
            IngestOutcome::Skipped { .. } => None,
        }
    }
}

/// A batch that stopped early. `outcomes` covers the inputs handled before
/// the failure; every `Stored` photo in it is already persisted.
#[derive(Debug, thiserror::Error)]
#[error("upload batch stopped: {source}")]
pub struct IngestError {
    pub outcomes: Vec<IngestOutcome>,
    pub source: SnapError,
}

impl IngestError {
    fn before_start(source: SnapError) -> Self {
        IngestError {
            outcomes: Vec::new(),
            source,
        }
    }

    /// Photos written before the failure.
    pub fn stored(&self) -> usize {
        self.outcomes.iter().filter(|o| o.photo().is_some()).count()
    }
}

#[derive(Clone)]
pub struct PhotoIngestor {
    store: EventStore,
    blobs: BlobRegistry,
}

impl PhotoIngestor {
    pub fn new(store: EventStore, blobs: BlobRegistry) -> Self {
        PhotoIngestor { store, blobs }
    }

    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    pub fn ingest(&self, event_id: &str, inputs: Vec<ImageInput>) -> Result<Vec<IngestOutcome>, IngestError> {
        self.ingest_with_progress(event_id, inputs, |_, _| {})
    }

    /// Store every image in `inputs` on the event, in order, one write per
    /// photo. `on_progress(stored, total)` runs after each successful write.
    ///
    /// Fails with `NotFound` before touching anything if the event is
    /// missing. A failed write aborts the rest of the batch; the error
    /// carries the outcomes gathered up to that point.
    pub fn ingest_with_progress(
        &self,
        event_id: &str,
        inputs: Vec<ImageInput>,
        mut on_progress: impl FnMut(usize, usize),
    ) -> Result<Vec<IngestOutcome>, IngestError> {
        self.store.get(event_id).map_err(IngestError::before_start)?;

        let total = inputs.iter().filter(|input| input.is_image()).count();
        let mut stored = 0;
        let mut outcomes = Vec::with_capacity(inputs.len());

        for input in inputs {
            if !input.is_image() {
                debug!(name = %input.name, mime_type = %input.mime_type, "skipping non-image upload");
                outcomes.push(IngestOutcome::Skipped {
                    name: input.name,
                    mime_type: input.mime_type,
                });
                continue;
            }

            let photo = self.photo_for(input);
            if let Err(err) = self.store.append_photo(event_id, photo.clone()) {
                self.blobs.revoke(&photo.url);
                warn!(event_id = %event_id, stored, %err, "upload batch aborted");
                return Err(IngestError {
                    outcomes,
                    source: err,
                });
            }

            stored += 1;
            on_progress(stored, total);
            outcomes.push(IngestOutcome::Stored(photo));
        }

        info!(
            event_id = %event_id,
            stored,
            skipped = outcomes.len() - stored,
            "ingested upload batch"
        );
        Ok(outcomes)
    }

    fn photo_for(&self, input: ImageInput) -> Photo {
        let url = self.blobs.register(input.bytes, &input.mime_type);
        Photo {
            id: self.store.new_id(),
            name: input.name,
            uploaded_at: self.store.now(),
            url,
            size: Some(input.size),
            mime_type: Some(input.mime_type),
        }
    }
}
