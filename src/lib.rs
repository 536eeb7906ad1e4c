//! form-assist — AI-assisted field input engine for declarative forms.
//!
//! A form is declared as an array of [`schema::FieldDescriptor`]s.  For each
//! field the [`dispatch::FieldDispatcher`] selects one of the fixed widget
//! behaviours and owns the normalization rules applied on commit.  Fields
//! flagged with the assist entry point share a single
//! [`assist::AssistController`]: the user types or speaks, the transcript is
//! debounced through a quiescence window, routed through language detection
//! to the matching content-generation endpoint, and the pending response is
//! merged into the shared [`state::FormState`] only on an explicit commit.
//! Image batches go through the [`upload::UploadManager`] with per-file
//! validation and append-only merging.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use form_assist::ai::HttpContentGenerator;
//! use form_assist::config::AppConfig;
//! use form_assist::engine::FormEngine;
//! use form_assist::state::{FormHandle, FormState};
//! use form_assist::upload::HttpImageStore;
//! use form_assist::voice::UnavailableRecognizer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::load().unwrap_or_default();
//!     let form = FormHandle::new(FormState::new());
//!     let (events_tx, mut events_rx) = tokio::sync::mpsc::channel(64);
//!
//!     let engine = FormEngine::mount(
//!         &config,
//!         form,
//!         Arc::new(HttpContentGenerator::from_config(&config.endpoints, &config.ai)),
//!         Arc::new(UnavailableRecognizer),
//!         Arc::new(HttpImageStore::from_config(&config.endpoints, &config.upload)),
//!         events_tx,
//!     )
//!     .await;
//!
//!     // … drive fields through engine.dispatcher() / engine.assist() …
//!     while let Some(event) = events_rx.recv().await {
//!         println!("{event:?}");
//!     }
//!     engine.unmount();
//! }
//! ```

pub mod ai;
pub mod assist;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod events;
pub mod schema;
pub mod state;
pub mod upload;
pub mod voice;

pub use engine::FormEngine;
pub use events::EngineEvent;
