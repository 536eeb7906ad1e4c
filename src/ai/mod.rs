//! Content-generation backends.
//!
//! This module provides:
//! * [`ContentGenerator`] — async trait implemented by all generation
//!   backends (language listing/detection, title, description, image
//!   generate/edit).
//! * [`HttpContentGenerator`] — production backend that calls the configured
//!   remote endpoints over HTTP.
//! * [`prompts`] — the prompt texts sent with each generation request.
//! * [`AiError`] — error variants for generation operations.
//! * [`LanguageOption`] / [`GeneratedImage`] — wire-level payload types.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use form_assist::ai::{ContentGenerator, HttpContentGenerator};
//! use form_assist::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let generator = HttpContentGenerator::from_config(&config.endpoints, &config.ai);
//!
//!     let lang = generator.detect_language("नीली चाय की केतली").await.unwrap();
//!     let title = generator.generate_title("नीली चाय की केतली", &lang).await.unwrap();
//!     println!("{title}");
//! }
//! ```

pub mod generator;
pub mod prompts;

pub use generator::{AiError, ContentGenerator, GeneratedImage, HttpContentGenerator};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LanguageOption
// ---------------------------------------------------------------------------

/// One selectable recognition/generation language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageOption {
    /// Human-readable name shown in the language picker.
    pub display_name: String,
    /// BCP-47 / ISO language code passed to recognition and generation.
    pub code: String,
}

impl LanguageOption {
    pub fn new(display_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            code: code.into(),
        }
    }

    /// The language preselected when the assist dialog opens and no other
    /// choice has been made yet.
    pub fn fallback() -> Self {
        Self::new("Hindi", "hi")
    }
}

impl Default for LanguageOption {
    fn default() -> Self {
        Self::fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_hindi() {
        let lang = LanguageOption::fallback();
        assert_eq!(lang.display_name, "Hindi");
        assert_eq!(lang.code, "hi");
    }
}
