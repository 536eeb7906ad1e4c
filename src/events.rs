//! Engine → host notification events.
//!
//! The engine never renders toasts or spinners itself; it pushes
//! [`EngineEvent`]s over a `tokio::sync::mpsc` channel and the host decides
//! how to present them.  Every event is transient — none of them is ever
//! written into form state.

/// Notifications delivered from the engine to the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The language list finished loading; `count` entries after dedup.
    LanguagesLoaded { count: usize },

    /// A recognition session began.
    ListeningStarted,

    /// The recognition session ended (natural end of speech).
    ListeningEnded,

    /// The assist dialog holds a new pending response for `field_id`.
    ResponseReady { field_id: String },

    /// A batch upload started; `files` accepted files are in flight.
    UploadStarted { files: usize },

    /// A batch upload finished; `added` images were merged into `field_id`.
    UploadComplete { field_id: String, added: usize },

    /// Short-lived failure notification (network, capability, …).
    Error { message: String },

    /// Per-file validation warning; siblings in the batch proceed.
    Warning { message: String },
}
