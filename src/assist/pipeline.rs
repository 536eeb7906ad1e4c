//! Assist controller — drives the open → speak/type → detect → generate →
//! commit loop for the single shared assist dialog.
//!
//! # Pipeline flow
//!
//! ```text
//! open(field)
//!   └─▶ set_text / utterance ──▶ debounce lane (1 s quiescence)
//!         └─▶ attribute field → transcript becomes the pending response
//!         └─▶ otherwise       → detect language → title/description/image
//!               ├─ Ok  → pending response in the slot, ResponseReady event
//!               └─ Err → loading cleared, Error event, user retries
//! submit()       → merge text into form state (uppercase rule), reset
//! attach_image() → append image to the field's list, reset
//! close()        → reset; the epoch bump makes in-flight work inert
//! ```
//!
//! All interaction state lives behind one mutex; locks are short and never
//! held across `.await` points.  Each dispatch captures the interaction
//! epoch before its first await and re-checks it before every write, so a
//! response completing after the dialog was closed (or re-targeted) is
//! discarded instead of resurrecting stale state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::ai::{AiError, ContentGenerator, LanguageOption};
use crate::assist::debounce::{DebounceLane, LaneFeed};
use crate::assist::interaction::{
    AssistInteraction, AssistKind, AssistRoutes, AssistTarget, ResponsePayload,
};
use crate::config::{AiConfig, VoiceConfig};
use crate::events::EngineEvent;
use crate::schema::FieldDescriptor;
use crate::state::{FieldValue, FormHandle, ImageRef};
use crate::voice::{SpeechError, SpeechEvent, SpeechRecognizer};

// ---------------------------------------------------------------------------
// Shared dispatch context
// ---------------------------------------------------------------------------

/// What a dispatch (or the voice-routing task) needs to run detached from
/// the controller borrow.
#[derive(Clone)]
struct Shared {
    interaction: Arc<Mutex<AssistInteraction>>,
    generator: Arc<dyn ContentGenerator>,
    events: mpsc::Sender<EngineEvent>,
}

/// Mark the interaction loading; `false` when the epoch already moved.
fn begin_loading(shared: &Shared, epoch: u64) -> bool {
    let mut interaction = shared.interaction.lock().unwrap();
    if interaction.epoch() != epoch {
        return false;
    }
    interaction.loading = true;
    true
}

/// Clear the loading flag and surface a transient error — unless the dialog
/// was reset meanwhile, in which case the failure is irrelevant.
fn fail(shared: &Shared, epoch: u64, error: &AiError) {
    {
        let mut interaction = shared.interaction.lock().unwrap();
        if interaction.epoch() != epoch {
            return;
        }
        interaction.loading = false;
    }
    log::warn!("assist request failed: {error}");
    let _ = shared.events.try_send(EngineEvent::Error {
        message: error.to_string(),
    });
}

// ---------------------------------------------------------------------------
// Primary-lane dispatch
// ---------------------------------------------------------------------------

async fn dispatch_primary(shared: Shared, text: String) {
    if text.trim().is_empty() {
        return;
    }

    let (target, epoch) = {
        let interaction = shared.interaction.lock().unwrap();
        match &interaction.target {
            Some(target) => (target.clone(), interaction.epoch()),
            None => return,
        }
    };
    let Some(kind) = target.kind else { return };

    // Attribute passthrough skips detection and generation entirely.
    if kind == AssistKind::Attribute {
        {
            let mut interaction = shared.interaction.lock().unwrap();
            if interaction.epoch() != epoch {
                return;
            }
            interaction.response = Some(ResponsePayload::Text(text));
            interaction.loading = false;
        }
        let _ = shared.events.try_send(EngineEvent::ResponseReady {
            field_id: target.field_id,
        });
        return;
    }

    if !begin_loading(&shared, epoch) {
        return;
    }

    let language = match shared.generator.detect_language(&text).await {
        Ok(language) => language,
        Err(e) => return fail(&shared, epoch, &e),
    };
    {
        let mut interaction = shared.interaction.lock().unwrap();
        if interaction.epoch() != epoch {
            return;
        }
        interaction.detected_language = Some(language.clone());
    }

    let outcome = match kind {
        AssistKind::Title => shared
            .generator
            .generate_title(&text, &language)
            .await
            .map(ResponsePayload::Text),
        AssistKind::Description { concise } => shared
            .generator
            .generate_description(&text, &language, concise)
            .await
            .map(ResponsePayload::Text),
        AssistKind::Image => shared
            .generator
            .generate_image(&text, &language)
            .await
            .map(ResponsePayload::Image),
        AssistKind::Attribute => return,
    };

    match outcome {
        Ok(payload) => {
            {
                let mut interaction = shared.interaction.lock().unwrap();
                if interaction.epoch() != epoch {
                    return;
                }
                if let (ResponsePayload::Text(content), AssistKind::Description { .. }) =
                    (&payload, kind)
                {
                    interaction.markdown_preview = content.clone();
                }
                interaction.response = Some(payload);
                interaction.loading = false;
            }
            let _ = shared.events.try_send(EngineEvent::ResponseReady {
                field_id: target.field_id,
            });
        }
        Err(e) => fail(&shared, epoch, &e),
    }
}

// ---------------------------------------------------------------------------
// Edit-lane dispatch
// ---------------------------------------------------------------------------

async fn dispatch_edit(shared: Shared, text: String) {
    if text.trim().is_empty() {
        return;
    }

    // Editing only makes sense over an existing image response.
    let (field_id, file_name, epoch) = {
        let interaction = shared.interaction.lock().unwrap();
        match (&interaction.target, &interaction.response) {
            (Some(target), Some(ResponsePayload::Image(image))) if interaction.edit_mode => (
                target.field_id.clone(),
                image.name.clone(),
                interaction.epoch(),
            ),
            _ => return,
        }
    };

    if !begin_loading(&shared, epoch) {
        return;
    }

    let language = match shared.generator.detect_language(&text).await {
        Ok(language) => language,
        Err(e) => return fail(&shared, epoch, &e),
    };

    match shared.generator.edit_image(&text, &language, &file_name).await {
        Ok(image) => {
            {
                let mut interaction = shared.interaction.lock().unwrap();
                if interaction.epoch() != epoch {
                    return;
                }
                // The edited render replaces the pending image in place.
                interaction.response = Some(ResponsePayload::Image(image));
                interaction.loading = false;
            }
            let _ = shared.events.try_send(EngineEvent::ResponseReady { field_id });
        }
        Err(e) => fail(&shared, epoch, &e),
    }
}

// ---------------------------------------------------------------------------
// Voice-event routing
// ---------------------------------------------------------------------------

async fn route_speech(
    shared: Shared,
    mut rx: mpsc::Receiver<SpeechEvent>,
    primary_feed: LaneFeed,
    edit_feed: LaneFeed,
) {
    while let Some(event) = rx.recv().await {
        match event {
            SpeechEvent::Started => {
                let notify = {
                    let mut interaction = shared.interaction.lock().unwrap();
                    if interaction.is_open() {
                        interaction.listening = true;
                        true
                    } else {
                        false
                    }
                };
                if notify {
                    let _ = shared.events.try_send(EngineEvent::ListeningStarted);
                }
            }
            SpeechEvent::Utterance(text) => {
                let routed = {
                    let mut interaction = shared.interaction.lock().unwrap();
                    if interaction.is_open() {
                        let accumulated = interaction.append_utterance(&text);
                        Some((accumulated, interaction.edit_mode))
                    } else {
                        None
                    }
                };
                if let Some((accumulated, edit_mode)) = routed {
                    let feed = if edit_mode { &edit_feed } else { &primary_feed };
                    feed.push(accumulated);
                }
            }
            SpeechEvent::Ended => {
                shared.interaction.lock().unwrap().listening = false;
                let _ = shared.events.try_send(EngineEvent::ListeningEnded);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// AssistController
// ---------------------------------------------------------------------------

/// Owner of the single shared assist dialog.
///
/// Create one per mounted form with [`AssistController::new`]; every field
/// shares it.  The controller spawns its two debounce lanes on the current
/// tokio runtime and aborts them on drop or [`shutdown`](Self::shutdown).
pub struct AssistController {
    shared: Shared,
    form: FormHandle,
    routes: AssistRoutes,
    recognizer: Arc<dyn SpeechRecognizer>,
    default_language: LanguageOption,
    primary_lane: DebounceLane,
    edit_lane: DebounceLane,
}

impl AssistController {
    pub fn new(
        form: FormHandle,
        generator: Arc<dyn ContentGenerator>,
        recognizer: Arc<dyn SpeechRecognizer>,
        routes: AssistRoutes,
        events: mpsc::Sender<EngineEvent>,
        ai: &AiConfig,
        voice: &VoiceConfig,
    ) -> Self {
        let shared = Shared {
            interaction: Arc::new(Mutex::new(AssistInteraction::new(
                voice.default_language.clone(),
            ))),
            generator,
            events,
        };

        let window = Duration::from_millis(ai.debounce_ms);
        let primary_ctx = shared.clone();
        let primary_lane =
            DebounceLane::spawn(window, move |text| dispatch_primary(primary_ctx.clone(), text));
        let edit_ctx = shared.clone();
        let edit_lane =
            DebounceLane::spawn(window, move |text| dispatch_edit(edit_ctx.clone(), text));

        Self {
            shared,
            form,
            routes,
            recognizer,
            default_language: voice.default_language.clone(),
            primary_lane,
            edit_lane,
        }
    }

    // -----------------------------------------------------------------------
    // Dialog lifecycle
    // -----------------------------------------------------------------------

    /// Point the dialog at `descriptor`, resetting any previous interaction.
    /// Pending debounce values from the previous target are discarded.
    pub fn open(&self, descriptor: &FieldDescriptor) {
        self.primary_lane.cancel();
        self.edit_lane.cancel();
        let target = AssistTarget::for_descriptor(descriptor, &self.routes);
        let mut interaction = self.shared.interaction.lock().unwrap();
        interaction.open(target, &self.default_language);
    }

    /// Close the dialog without committing.  Pending debounce timers are
    /// cancelled and anything already in flight becomes inert via the epoch
    /// bump.
    pub fn close(&self) {
        self.primary_lane.cancel();
        self.edit_lane.cancel();
        let mut interaction = self.shared.interaction.lock().unwrap();
        interaction.reset(&self.default_language);
    }

    /// Clone out the current dialog state for rendering.
    pub fn snapshot(&self) -> AssistInteraction {
        self.shared.interaction.lock().unwrap().clone()
    }

    /// Select the recognition language; applies at the next listen start.
    pub fn select_language(&self, option: LanguageOption) {
        self.shared.interaction.lock().unwrap().language = option;
    }

    // -----------------------------------------------------------------------
    // Text input
    // -----------------------------------------------------------------------

    /// Replace the primary transcript with typed text and re-arm the lane.
    pub fn set_text(&self, text: &str) {
        let open = {
            let mut interaction = self.shared.interaction.lock().unwrap();
            if interaction.is_open() {
                interaction.transcript = text.to_string();
                true
            } else {
                false
            }
        };
        if open {
            self.primary_lane.push(text);
        }
    }

    /// Replace the image-edit transcript with typed text and re-arm its lane.
    pub fn set_edit_text(&self, text: &str) {
        let armed = {
            let mut interaction = self.shared.interaction.lock().unwrap();
            if interaction.is_open() && interaction.edit_mode {
                interaction.edit_transcript = text.to_string();
                true
            } else {
                false
            }
        };
        if armed {
            self.edit_lane.push(text);
        }
    }

    // -----------------------------------------------------------------------
    // Voice input
    // -----------------------------------------------------------------------

    /// Start a recognition session in the selected language.
    ///
    /// A no-op while a response is loading.  Outside edit mode the previous
    /// response and transcript are cleared first; in edit mode the pending
    /// image survives and utterances go to the edit transcript instead.
    ///
    /// Returns [`SpeechError::Unavailable`] synchronously when the platform
    /// has no recognition capability.
    pub fn start_listening(&self) -> Result<(), SpeechError> {
        let language = {
            let mut interaction = self.shared.interaction.lock().unwrap();
            if interaction.loading || !interaction.is_open() {
                return Ok(());
            }
            if !interaction.edit_mode {
                interaction.response = None;
                interaction.markdown_preview.clear();
            }
            interaction.transcript.clear();
            interaction.language.code.clone()
        };

        let (tx, rx) = mpsc::channel(16);
        self.recognizer.start(&language, tx)?;

        tokio::spawn(route_speech(
            self.shared.clone(),
            rx,
            self.primary_lane.feed(),
            self.edit_lane.feed(),
        ));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Image edit
    // -----------------------------------------------------------------------

    /// Enter edit mode over the pending generated image.
    pub fn begin_image_edit(&self) {
        let mut interaction = self.shared.interaction.lock().unwrap();
        if matches!(interaction.response, Some(ResponsePayload::Image(_))) {
            interaction.edit_mode = true;
        }
    }

    /// Drop the pending generated image and its transcript so the user can
    /// start over without closing the dialog.
    pub fn discard_pending_image(&self) {
        let mut interaction = self.shared.interaction.lock().unwrap();
        if matches!(interaction.response, Some(ResponsePayload::Image(_))) {
            interaction.response = None;
            interaction.transcript.clear();
        }
    }

    // -----------------------------------------------------------------------
    // Commit
    // -----------------------------------------------------------------------

    /// Merge the pending text response into form state and close the dialog.
    ///
    /// Refused (returns `false`) while loading or when no text response is
    /// pending.  Uppercase-only fields store the upper-cased value; numeric
    /// fields store a numeric string.
    pub fn submit(&self) -> bool {
        let (field_id, content, uppercase, numeric) = {
            let interaction = self.shared.interaction.lock().unwrap();
            if interaction.loading {
                return false;
            }
            match (&interaction.target, &interaction.response) {
                (Some(target), Some(ResponsePayload::Text(content))) => (
                    target.field_id.clone(),
                    content.clone(),
                    target.uppercase,
                    target.numeric,
                ),
                _ => return false,
            }
        };

        let content = if uppercase {
            content.to_uppercase()
        } else {
            content
        };
        let value = if numeric {
            FieldValue::Number(content)
        } else {
            FieldValue::Text(content)
        };
        self.form.update(|state| state.set(&field_id, value));
        self.close();
        true
    }

    /// Append the pending generated image to the field's image list and
    /// close the dialog.  Returns the committed ref so the host can mirror
    /// it into any preview list.
    ///
    /// Refused (returns `None`) while loading or when no image is pending.
    pub fn attach_image(&self) -> Option<ImageRef> {
        let (field_id, image) = {
            let interaction = self.shared.interaction.lock().unwrap();
            if interaction.loading {
                return None;
            }
            match (&interaction.target, &interaction.response) {
                (Some(target), Some(ResponsePayload::Image(image))) => {
                    (target.field_id.clone(), image.clone())
                }
                _ => return None,
            }
        };

        let committed = ImageRef {
            url: image.url,
            name: image.name,
        };
        let appended = committed.clone();
        self.form
            .update(move |state| state.push_images(&field_id, vec![appended]));
        self.close();
        Some(committed)
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Abort both lanes and reset the dialog.  Called on engine unmount so
    /// no timer or in-flight response can write into stale state.
    pub fn shutdown(&self) {
        self.primary_lane.abort();
        self.edit_lane.abort();
        self.close();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
