//! The deduplicated language list, fetched once per engine mount.
//!
//! The remote list endpoint may repeat a display name under several codes
//! (e.g. `hi` and `hi-IN` both labelled "Hindi"); the catalog keeps the
//! first occurrence of each display name in stable order.  A failed fetch
//! degrades to an empty catalog — voice and AI assist are effectively
//! disabled, everything else keeps working.

use crate::ai::{AiError, ContentGenerator, LanguageOption};

/// Deduplicated, order-preserving language list.
#[derive(Debug, Clone, Default)]
pub struct LanguageCatalog {
    options: Vec<LanguageOption>,
}

impl LanguageCatalog {
    /// Catalog with no entries (fetch failed or not yet performed).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from a raw list, keeping the first occurrence of
    /// each display name.
    pub fn from_options(raw: Vec<LanguageOption>) -> Self {
        let mut options: Vec<LanguageOption> = Vec::with_capacity(raw.len());
        for option in raw {
            if !options.iter().any(|o| o.display_name == option.display_name) {
                options.push(option);
            }
        }
        Self { options }
    }

    /// Fetch the list from the backend and deduplicate it.
    pub async fn fetch(generator: &dyn ContentGenerator) -> Result<Self, AiError> {
        let raw = generator.list_languages().await?;
        Ok(Self::from_options(raw))
    }

    pub fn options(&self) -> &[LanguageOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Look an entry up by its display name.
    pub fn find(&self, display_name: &str) -> Option<&LanguageOption> {
        self.options.iter().find(|o| o.display_name == display_name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
