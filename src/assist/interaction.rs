//! Transient state of the single shared assist dialog.
//!
//! Exactly one [`AssistInteraction`] exists across the whole form; opening
//! the dialog for a field points the interaction at that field, and closing
//! it (or committing) resets everything.  The `epoch` counter is the
//! staleness guard: it bumps on every reset, and an async completion whose
//! captured epoch no longer matches writes nothing.

use std::collections::HashMap;

use crate::ai::{GeneratedImage, LanguageOption};
use crate::schema::{FieldDescriptor, Variant};

// ---------------------------------------------------------------------------
// ResponsePayload
// ---------------------------------------------------------------------------

/// A pending AI response waiting for the user to commit or discard it.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// Text destined for an input / description / numeric field.
    Text(String),
    /// A generated image destined for an upload field.
    Image(GeneratedImage),
}

// ---------------------------------------------------------------------------
// AssistKind
// ---------------------------------------------------------------------------

/// Which generation behaviour a field's transcript is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistKind {
    /// Title generation (detect language, then the title endpoint).
    Title,
    /// Description generation; `concise` selects the short 2-3 point form.
    Description { concise: bool },
    /// Generic attribute passthrough — the transcript itself becomes the
    /// pending response, with no detection or generation call.
    Attribute,
    /// Image generation (and, in edit mode, image editing).
    Image,
}

// ---------------------------------------------------------------------------
// AssistRoutes
// ---------------------------------------------------------------------------

/// Registry mapping field ids onto [`AssistKind`]s.
///
/// The default routing covers the product form; hosts add or override
/// entries instead of branching on field ids anywhere else.  A field with no
/// route (and a non-numeric variant) opens the dialog but its transcript is
/// never dispatched.
#[derive(Debug, Clone)]
pub struct AssistRoutes {
    routes: HashMap<String, AssistKind>,
}

impl AssistRoutes {
    /// Empty registry.
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Register (or override) a route.
    pub fn insert(&mut self, field_id: impl Into<String>, kind: AssistKind) {
        self.routes.insert(field_id.into(), kind);
    }

    /// Resolve the assist kind for a field.  Unrouted numeric fields fall
    /// back to attribute passthrough.
    pub fn kind_for(&self, descriptor: &FieldDescriptor) -> Option<AssistKind> {
        self.routes.get(&descriptor.id).copied().or({
            if descriptor.variant == Variant::Number {
                Some(AssistKind::Attribute)
            } else {
                None
            }
        })
    }
}

impl Default for AssistRoutes {
    fn default() -> Self {
        let mut routes = Self::empty();
        routes.insert("productName", AssistKind::Title);
        routes.insert("description", AssistKind::Description { concise: true });
        routes.insert("longDescription", AssistKind::Description { concise: false });
        routes.insert("images", AssistKind::Image);
        routes.insert("attributes", AssistKind::Attribute);
        for dimension in ["packQty", "length", "breadth", "height", "weight"] {
            routes.insert(dimension, AssistKind::Attribute);
        }
        routes
    }
}

// ---------------------------------------------------------------------------
// AssistTarget
// ---------------------------------------------------------------------------

/// The field the open dialog is pointed at.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistTarget {
    pub field_id: String,
    /// `None` when the field has no route — the dialog opens but text is
    /// never dispatched.
    pub kind: Option<AssistKind>,
    /// Committed text is upper-cased before merge.
    pub uppercase: bool,
    /// The field stores a numeric string.
    pub numeric: bool,
}

impl AssistTarget {
    pub fn for_descriptor(descriptor: &FieldDescriptor, routes: &AssistRoutes) -> Self {
        Self {
            field_id: descriptor.id.clone(),
            kind: routes.kind_for(descriptor),
            uppercase: descriptor.uppercase,
            numeric: descriptor.variant == Variant::Number,
        }
    }
}

// ---------------------------------------------------------------------------
// AssistInteraction
// ---------------------------------------------------------------------------

/// Everything the assist dialog holds between open and close.
#[derive(Debug, Clone)]
pub struct AssistInteraction {
    /// Field the dialog is pointed at; `None` while closed.
    pub target: Option<AssistTarget>,
    /// Accumulated primary transcript (typed or spoken).
    pub transcript: String,
    /// Accumulated image-edit instruction transcript.
    pub edit_transcript: String,
    /// Whether utterances are routed to the edit transcript.
    pub edit_mode: bool,
    /// Language code returned by the last successful detection.
    pub detected_language: Option<String>,
    /// Pending response waiting for the user to commit.
    pub response: Option<ResponsePayload>,
    /// Markdown preview buffer (mirrors text responses for description
    /// fields so the host can render a preview toggle).
    pub markdown_preview: String,
    /// A detection or generation request is in flight.
    pub loading: bool,
    /// A recognition session is active.
    pub listening: bool,
    /// Language selected for recognition; applies at the next start.
    pub language: LanguageOption,
    epoch: u64,
}

impl AssistInteraction {
    pub fn new(language: LanguageOption) -> Self {
        Self {
            target: None,
            transcript: String::new(),
            edit_transcript: String::new(),
            edit_mode: false,
            detected_language: None,
            response: None,
            markdown_preview: String::new(),
            loading: false,
            listening: false,
            language,
            epoch: 0,
        }
    }

    /// `true` while the dialog is pointed at a field.
    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    /// Current staleness epoch.  Completions capture it before awaiting and
    /// compare before writing.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Reset every transient field and invalidate in-flight work.
    ///
    /// `default_language` restores the preselected language so the next open
    /// starts from a known state.
    pub fn reset(&mut self, default_language: &LanguageOption) {
        self.target = None;
        self.transcript.clear();
        self.edit_transcript.clear();
        self.edit_mode = false;
        self.detected_language = None;
        self.response = None;
        self.markdown_preview.clear();
        self.loading = false;
        self.listening = false;
        self.language = default_language.clone();
        self.epoch += 1;
    }

    /// Point the dialog at a new target (resets first).
    pub fn open(&mut self, target: AssistTarget, default_language: &LanguageOption) {
        self.reset(default_language);
        self.target = Some(target);
    }

    /// Append an utterance, space-joined, to the active transcript; returns
    /// the accumulated text.  Recognition may deliver several partial
    /// results per session, so appends never replace.
    pub fn append_utterance(&mut self, text: &str) -> String {
        let buffer = if self.edit_mode {
            &mut self.edit_transcript
        } else {
            &mut self.transcript
        };
        if buffer.is_empty() {
            buffer.push_str(text);
        } else {
            buffer.push(' ');
            buffer.push_str(text);
        }
        buffer.clone()
    }
}

impl Default for AssistInteraction {
    fn default() -> Self {
        Self::new(LanguageOption::fallback())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
