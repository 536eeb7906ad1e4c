//! The AI assist pipeline — the single shared assist dialog and its state
//! machine.
//!
//! This module provides:
//! * [`AssistController`] — owner of the one [`AssistInteraction`] shared by
//!   every field; drives voice capture, debounced dispatch, and commits.
//! * [`AssistInteraction`] / [`ResponsePayload`] — the dialog's transient
//!   state and pending response.
//! * [`AssistKind`] / [`AssistRoutes`] — how a field id maps onto a
//!   generation behaviour.
//! * [`DebounceLane`] — the quiescence-window timer that coalesces rapid
//!   input changes into one dispatch.
//! * [`LanguageCatalog`] — the deduplicated language list fetched once per
//!   engine mount.
//!
//! # Flow
//!
//! ```text
//! open(field) ──▶ type / speak ──▶ lane (1 s quiescence)
//!                                    └─▶ detect language ──▶ generate
//!                                          └─▶ pending response in the slot
//! submit / attach ──▶ merge into form state, reset the dialog
//! close ──▶ reset the dialog, discard anything still in flight
//! ```

pub mod debounce;
pub mod interaction;
pub mod language;
pub mod pipeline;

pub use debounce::DebounceLane;
pub use interaction::{AssistInteraction, AssistKind, AssistRoutes, AssistTarget, ResponsePayload};
pub use language::LanguageCatalog;
pub use pipeline::AssistController;
