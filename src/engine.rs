//! Engine assembly — wires the dispatcher, assist controller, upload
//! manager, and language catalog around one shared form handle.
//!
//! # Mount sequence
//!
//! 1. Fetch the language list once and deduplicate it (a failure degrades
//!    to an empty catalog with an error notification — voice/AI assist is
//!    effectively disabled, everything else keeps working).
//! 2. Build the assist controller (spawns its debounce lanes).
//! 3. Build the upload manager.
//!
//! Unmounting with [`FormEngine::unmount`] aborts the lanes and resets the
//! dialog so nothing written by an in-flight request can land afterwards.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::ai::{ContentGenerator, LanguageOption};
use crate::assist::{AssistController, AssistRoutes, LanguageCatalog};
use crate::config::AppConfig;
use crate::dispatch::{FieldControl, FieldDispatcher};
use crate::events::EngineEvent;
use crate::schema::FieldDescriptor;
use crate::state::{FormHandle, ImageRef};
use crate::upload::{ImageStore, UploadManager};
use crate::voice::SpeechRecognizer;

/// One mounted form's engine.
pub struct FormEngine {
    form: FormHandle,
    assist: AssistController,
    uploads: UploadManager,
    languages: LanguageCatalog,
    dispatcher: FieldDispatcher,
}

impl FormEngine {
    /// Mount the engine over `form` with the default routes and rules.
    pub async fn mount(
        config: &AppConfig,
        form: FormHandle,
        generator: Arc<dyn ContentGenerator>,
        recognizer: Arc<dyn SpeechRecognizer>,
        store: Arc<dyn ImageStore>,
        events: mpsc::Sender<EngineEvent>,
    ) -> Self {
        let languages = match LanguageCatalog::fetch(generator.as_ref()).await {
            Ok(catalog) => {
                let _ = events.try_send(EngineEvent::LanguagesLoaded {
                    count: catalog.len(),
                });
                catalog
            }
            Err(e) => {
                log::warn!("language list fetch failed: {e}");
                let _ = events.try_send(EngineEvent::Error {
                    message: e.to_string(),
                });
                LanguageCatalog::empty()
            }
        };

        let assist = AssistController::new(
            form.clone(),
            generator,
            recognizer,
            AssistRoutes::default(),
            events.clone(),
            &config.ai,
            &config.voice,
        );
        let uploads = UploadManager::new(
            store,
            form.clone(),
            events,
            config.upload.max_file_bytes,
        );

        Self {
            form,
            assist,
            uploads,
            languages,
            dispatcher: FieldDispatcher::new(),
        }
    }

    /// Swap in a dispatcher with custom rules or a focus observer.
    pub fn with_dispatcher(mut self, dispatcher: FieldDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn form(&self) -> &FormHandle {
        &self.form
    }

    pub fn assist(&self) -> &AssistController {
        &self.assist
    }

    pub fn uploads(&self) -> &UploadManager {
        &self.uploads
    }

    pub fn dispatcher(&self) -> &FieldDispatcher {
        &self.dispatcher
    }

    /// Deduplicated language choices for the assist dialog's picker.
    pub fn languages(&self) -> &[LanguageOption] {
        self.languages.options()
    }

    // -----------------------------------------------------------------------
    // Convenience operations
    // -----------------------------------------------------------------------

    /// Produce the control for one field against the latest state snapshot.
    pub fn field(&self, descriptor: &FieldDescriptor, preview_only: bool) -> FieldControl {
        self.dispatcher
            .dispatch(descriptor, &self.form.snapshot(), preview_only)
    }

    /// Commit the assist dialog's pending generated image and mirror it
    /// into the upload preview list so both stay in step.
    pub fn attach_generated_image(&self) -> Option<ImageRef> {
        let committed = self.assist.attach_image()?;
        self.uploads.note_external(committed.clone());
        Some(committed)
    }

    /// Tear the engine down: abort debounce lanes and reset the dialog so
    /// in-flight responses cannot write into stale state.
    pub fn unmount(&self) {
        self.assist.shutdown();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
