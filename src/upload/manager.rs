//! Upload manager — per-file validation, one batch request, merge on
//! success.
//!
//! The manager keeps a local preview list mirroring what the host renders
//! next to the file input.  A successful batch **appends** to both the
//! preview list and the field's form-state array; a failed batch drops every
//! file and changes nothing.  While a batch is outstanding every file in it
//! counts toward [`loading_count`](UploadManager::loading_count) so the host
//! can render one placeholder per file.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use super::store::ImageStore;
use super::{validate_batch, PendingFile, UploadError};
use crate::events::EngineEvent;
use crate::state::{FormHandle, ImageRef};

/// Validates, uploads, and merges image batches for one upload field space.
pub struct UploadManager {
    store: Arc<dyn ImageStore>,
    form: FormHandle,
    events: mpsc::Sender<EngineEvent>,
    max_file_bytes: u64,
    preview: Arc<Mutex<Vec<ImageRef>>>,
    in_flight: Arc<Mutex<usize>>,
}

impl UploadManager {
    pub fn new(
        store: Arc<dyn ImageStore>,
        form: FormHandle,
        events: mpsc::Sender<EngineEvent>,
        max_file_bytes: u64,
    ) -> Self {
        Self {
            store,
            form,
            events,
            max_file_bytes,
            preview: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(Mutex::new(0)),
        }
    }

    // -----------------------------------------------------------------------
    // Batch handling
    // -----------------------------------------------------------------------

    /// Handle one change event's worth of files.
    ///
    /// Rejected files surface as [`EngineEvent::Warning`]s and never abort
    /// their siblings.  An empty accepted set performs no request.  On
    /// success the new refs are appended (never replacing) to the preview
    /// list and to `field_id`'s array in form state; on failure the whole
    /// batch is dropped and an [`EngineEvent::Error`] surfaces.
    pub async fn handle_files(
        &self,
        field_id: &str,
        files: Vec<PendingFile>,
    ) -> Result<Vec<ImageRef>, UploadError> {
        let (accepted, rejected) = validate_batch(files, self.max_file_bytes);
        for rejection in &rejected {
            log::warn!("upload rejected: {rejection}");
            let _ = self.events.try_send(EngineEvent::Warning {
                message: rejection.to_string(),
            });
        }
        if accepted.is_empty() {
            return Ok(Vec::new());
        }

        *self.in_flight.lock().unwrap() = accepted.len();
        let _ = self.events.try_send(EngineEvent::UploadStarted {
            files: accepted.len(),
        });

        let outcome = self.store.upload_batch(accepted).await;
        *self.in_flight.lock().unwrap() = 0;

        match outcome {
            Ok(uploaded) => {
                self.preview.lock().unwrap().extend(uploaded.iter().cloned());

                let field = field_id.to_string();
                let merged = uploaded.clone();
                self.form
                    .update(move |state| state.push_images(&field, merged));

                let _ = self.events.try_send(EngineEvent::UploadComplete {
                    field_id: field_id.to_string(),
                    added: uploaded.len(),
                });
                Ok(uploaded)
            }
            Err(e) => {
                log::warn!("batch upload failed: {e}");
                let _ = self.events.try_send(EngineEvent::Error {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Preview list
    // -----------------------------------------------------------------------

    /// Remove the image named `name` from both the preview list and
    /// `field_id`'s form-state array in one step.
    pub fn remove(&self, field_id: &str, name: &str) {
        self.preview.lock().unwrap().retain(|image| image.name != name);

        let field = field_id.to_string();
        let victim = name.to_string();
        self.form
            .update(move |state| state.remove_image(&field, &victim));
    }

    /// Replace the preview list with the images currently in form state —
    /// used when a form loads with previously uploaded images.
    pub fn sync_from_state(&self, field_id: &str) {
        let images = self.form.snapshot().images(field_id).to_vec();
        *self.preview.lock().unwrap() = images;
    }

    /// Record an image committed elsewhere (e.g. a generated image attached
    /// from the assist dialog) so the preview stays in step with state.
    pub fn note_external(&self, image: ImageRef) {
        self.preview.lock().unwrap().push(image);
    }

    /// Snapshot of the preview list.
    pub fn preview(&self) -> Vec<ImageRef> {
        self.preview.lock().unwrap().clone()
    }

    /// Number of files in the outstanding batch (0 when idle).
    pub fn loading_count(&self) -> usize {
        *self.in_flight.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FieldValue, FormState};
    use crate::upload::store::MockStore;

    fn make_manager(store: MockStore) -> (UploadManager, mpsc::Receiver<EngineEvent>, FormHandle) {
        let form = FormHandle::new(FormState::new());
        let (events_tx, events_rx) = mpsc::channel(64);
        let manager = UploadManager::new(Arc::new(store), form.clone(), events_tx, 2 * 1024 * 1024);
        (manager, events_rx, form)
    }

    fn image(name: &str) -> PendingFile {
        PendingFile::new(name, "image/png", vec![0u8; 16])
    }

    fn drain(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// New URLs append to existing form-state entries — nothing is dropped,
    /// order is preserved.
    #[tokio::test]
    async fn merge_appends_to_existing_images() {
        let (manager, _events, form) = make_manager(MockStore::ok());
        form.update(|state| {
            state.set(
                "images",
                FieldValue::Images(vec![ImageRef {
                    url: "a".into(),
                    name: "a.png".into(),
                }]),
            )
        });
        manager.sync_from_state("images");

        manager
            .handle_files("images", vec![image("b.png"), image("c.png")])
            .await
            .unwrap();

        let urls: Vec<_> = form
            .snapshot()
            .images("images")
            .iter()
            .map(|i| i.url.clone())
            .collect();
        assert_eq!(urls, vec!["a", "https://cdn/b.png", "https://cdn/c.png"]);
        assert_eq!(manager.preview().len(), 3);
    }

    /// A rejected file warns and is excluded; its siblings still upload.
    #[tokio::test]
    async fn rejection_excludes_only_the_offending_file() {
        let store = MockStore::ok();
        let (manager, mut events, form) = make_manager(store);

        let files = vec![
            image("ok.png"),
            PendingFile::new("notes.pdf", "application/pdf", vec![0u8; 8]),
        ];
        manager.handle_files("images", files).await.unwrap();

        let names: Vec<_> = form
            .snapshot()
            .images("images")
            .iter()
            .map(|i| i.name.clone())
            .collect();
        assert_eq!(names, vec!["ok.png"]);

        let events = drain(&mut events);
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::Warning { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::UploadComplete { added: 1, .. })));
    }

    /// When every file is rejected no request is made at all.
    #[tokio::test]
    async fn fully_rejected_batch_performs_no_request() {
        let store = Arc::new(MockStore::ok());
        let form = FormHandle::new(FormState::new());
        let (events_tx, _events_rx) = mpsc::channel(64);
        let manager =
            UploadManager::new(store.clone(), form.clone(), events_tx, 2 * 1024 * 1024);

        let merged = manager
            .handle_files(
                "images",
                vec![PendingFile::new("huge.png", "image/png", vec![0u8; 3 * 1024 * 1024])],
            )
            .await
            .unwrap();

        assert!(merged.is_empty());
        assert!(form.snapshot().is_empty());
        assert!(store.batches().is_empty());
    }

    /// A failed batch merges nothing — no partial results anywhere.
    #[tokio::test]
    async fn failed_batch_is_dropped_entirely() {
        let (manager, mut events, form) = make_manager(MockStore::failing(UploadError::Timeout));

        let result = manager
            .handle_files("images", vec![image("a.png"), image("b.png")])
            .await;

        assert!(result.is_err());
        assert!(form.snapshot().is_empty());
        assert!(manager.preview().is_empty());
        assert_eq!(manager.loading_count(), 0);
        assert!(drain(&mut events)
            .iter()
            .any(|e| matches!(e, EngineEvent::Error { .. })));
    }

    /// Removing by name updates preview and state together.
    #[tokio::test]
    async fn remove_updates_preview_and_state_atomically() {
        let (manager, _events, form) = make_manager(MockStore::ok());
        manager
            .handle_files("images", vec![image("a.png"), image("b.png")])
            .await
            .unwrap();

        manager.remove("images", "a.png");

        let names: Vec<_> = form
            .snapshot()
            .images("images")
            .iter()
            .map(|i| i.name.clone())
            .collect();
        assert_eq!(names, vec!["b.png"]);
        assert_eq!(manager.preview().len(), 1);
        assert_eq!(manager.preview()[0].name, "b.png");
    }

    #[tokio::test]
    async fn sync_from_state_replaces_preview() {
        let (manager, _events, form) = make_manager(MockStore::ok());
        form.update(|state| {
            state.push_images(
                "images",
                vec![ImageRef {
                    url: "x".into(),
                    name: "x.png".into(),
                }],
            )
        });

        manager.sync_from_state("images");
        assert_eq!(manager.preview().len(), 1);
    }

    #[tokio::test]
    async fn upload_events_bracket_the_batch() {
        let (manager, mut events, _form) = make_manager(MockStore::ok());
        manager
            .handle_files("images", vec![image("a.png")])
            .await
            .unwrap();

        let events = drain(&mut events);
        assert!(matches!(events[0], EngineEvent::UploadStarted { files: 1 }));
        assert!(matches!(
            events[1],
            EngineEvent::UploadComplete { added: 1, .. }
        ));
    }
}
