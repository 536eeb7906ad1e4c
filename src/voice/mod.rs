//! Voice capture seam.
//!
//! # Design
//!
//! Speech recognition is a platform capability, not something this crate
//! implements.  [`SpeechRecognizer`] is the object-safe seam: `start`
//! begins **one** recognition session in the given language and streams
//! [`SpeechEvent`]s into the supplied channel.  The session ends on the
//! capability's own end-of-speech signal — there is no stop call.
//!
//! `start` fails *synchronously* with [`SpeechError::Unavailable`] when the
//! platform has no recognition capability, so the caller can tell the user
//! immediately; the session state machine never leaves idle in that case.
//!
//! [`UnavailableRecognizer`] is the production stub for platforms without a
//! capability — the rest of the engine keeps working with voice disabled.

use thiserror::Error;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors raised when starting a recognition session.
#[derive(Debug, Clone, Error)]
pub enum SpeechError {
    /// The platform offers no speech recognition capability.
    #[error("speech recognition is not available on this platform")]
    Unavailable,

    /// The capability exists but the session could not start.
    #[error("speech recognition failed to start: {0}")]
    Start(String),
}

// ---------------------------------------------------------------------------
// SpeechEvent
// ---------------------------------------------------------------------------

/// Events emitted by an active recognition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// The capability began listening.
    Started,
    /// One recognised utterance.  Recognition may emit several of these
    /// before finalisation; consumers append them rather than replacing.
    Utterance(String),
    /// The session ended (natural end of speech).
    Ended,
}

// ---------------------------------------------------------------------------
// SpeechRecognizer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface over the platform's speech capability.
///
/// # Contract
///
/// - `language` is the code the session recognises in; it is fixed for the
///   whole session (changing the selection mid-session only affects the
///   *next* start).
/// - Events are pushed into `events`; the implementation must send
///   [`SpeechEvent::Ended`] exactly once per successful start.
/// - Returns `Err(SpeechError::Unavailable)` synchronously when no
///   capability exists.
pub trait SpeechRecognizer: Send + Sync {
    fn start(
        &self,
        language: &str,
        events: mpsc::Sender<SpeechEvent>,
    ) -> Result<(), SpeechError>;
}

// Compile-time assertion: Box<dyn SpeechRecognizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechRecognizer>) {}
};

// ---------------------------------------------------------------------------
// UnavailableRecognizer
// ---------------------------------------------------------------------------

/// Production stub for platforms without a speech capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRecognizer;

impl SpeechRecognizer for UnavailableRecognizer {
    fn start(
        &self,
        _language: &str,
        _events: mpsc::Sender<SpeechEvent>,
    ) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// ScriptedRecognizer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that plays back a fixed sequence of utterances.
///
/// On `start` it records the requested language, then emits `Started`, each
/// utterance in order, and `Ended`.
#[cfg(test)]
pub struct ScriptedRecognizer {
    utterances: Vec<String>,
    started_with: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl ScriptedRecognizer {
    pub fn speaking<I, S>(utterances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            utterances: utterances.into_iter().map(Into::into).collect(),
            started_with: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Languages each session was started with, in order.
    pub fn started_with(&self) -> Vec<String> {
        self.started_with.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl SpeechRecognizer for ScriptedRecognizer {
    fn start(
        &self,
        language: &str,
        events: mpsc::Sender<SpeechEvent>,
    ) -> Result<(), SpeechError> {
        self.started_with.lock().unwrap().push(language.to_string());

        let utterances = self.utterances.clone();
        tokio::spawn(async move {
            let _ = events.send(SpeechEvent::Started).await;
            for utterance in utterances {
                let _ = events.send(SpeechEvent::Utterance(utterance)).await;
            }
            let _ = events.send(SpeechEvent::Ended).await;
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_recognizer_fails_synchronously() {
        let (tx, _rx) = mpsc::channel(4);
        let result = UnavailableRecognizer.start("hi", tx);
        assert!(matches!(result, Err(SpeechError::Unavailable)));
    }

    #[tokio::test]
    async fn scripted_recognizer_plays_back_in_order() {
        let recognizer = ScriptedRecognizer::speaking(["blue", "kettle"]);
        let (tx, mut rx) = mpsc::channel(8);

        recognizer.start("en", tx).unwrap();

        assert_eq!(rx.recv().await, Some(SpeechEvent::Started));
        assert_eq!(rx.recv().await, Some(SpeechEvent::Utterance("blue".into())));
        assert_eq!(rx.recv().await, Some(SpeechEvent::Utterance("kettle".into())));
        assert_eq!(rx.recv().await, Some(SpeechEvent::Ended));
        assert_eq!(rx.recv().await, None);

        assert_eq!(recognizer.started_with(), vec!["en".to_string()]);
    }
}
