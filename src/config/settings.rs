//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Nothing in the engine hardcodes a URL — every remote address lives in
//! [`EndpointsConfig`].

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::ai::LanguageOption;

// ---------------------------------------------------------------------------
// EndpointsConfig
// ---------------------------------------------------------------------------

/// Remote endpoint addresses consumed by the engine.
///
/// The defaults point at a local gateway and exist so development setups
/// work out of the box; production deployments override every entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// GET — list of supported languages.
    pub language_list: String,
    /// POST `[text]` — language detection.
    pub detect_language: String,
    /// POST — product title generation.
    pub generate_title: String,
    /// POST — product description generation.
    pub generate_description: String,
    /// POST — image generation.
    pub generate_image: String,
    /// POST — image editing (carries the previous image's file name).
    pub edit_image: String,
    /// POST multipart `images[]` — batch image upload.
    pub upload_images: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            language_list: "http://localhost:8080/api/v1/languages".into(),
            detect_language: "http://localhost:8080/api/v1/language-detect".into(),
            generate_title: "http://localhost:8080/api/v1/product-title".into(),
            generate_description: "http://localhost:8080/api/v1/product-description".into(),
            generate_image: "http://localhost:8080/api/v1/product-image".into(),
            edit_image: "http://localhost:8080/api/v1/product-image-edit".into(),
            upload_images: "http://localhost:8080/api/v1/gcp-upload".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AiConfig
// ---------------------------------------------------------------------------

/// Settings for the AI request pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Quiescence window for the transcript debounce lanes, in milliseconds.
    /// A new keystroke or utterance within the window resets the timer.
    pub debounce_ms: u64,
    /// Maximum seconds to wait for any generation or detection response.
    pub timeout_secs: u64,
    /// Storage bucket name sent with image generate/edit requests.
    pub image_bucket: String,
    /// Value of the `samplecount` header on image generate/edit requests.
    pub sample_count: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1_000,
            timeout_secs: 20,
            image_bucket: "gen-ai-399709-stg".into(),
            sample_count: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// UploadConfig
// ---------------------------------------------------------------------------

/// Settings for the image upload manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum size per file in bytes.  Larger files are rejected before the
    /// batch request is assembled.
    pub max_file_bytes: u64,
    /// Maximum seconds to wait for the batch upload response.
    pub timeout_secs: u64,
}

impl UploadConfig {
    /// 2 MiB — the per-file cap enforced client-side.
    pub const DEFAULT_MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: Self::DEFAULT_MAX_FILE_BYTES,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceConfig
// ---------------------------------------------------------------------------

/// Settings for voice capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Language preselected every time the assist dialog opens.
    pub default_language: LanguageOption,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            default_language: LanguageOption::fallback(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level engine configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use form_assist::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote endpoint addresses.
    pub endpoints: EndpointsConfig,
    /// AI pipeline settings.
    pub ai: AiConfig,
    /// Upload manager settings.
    pub upload: UploadConfig,
    /// Voice capture settings.
    pub voice: VoiceConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// A default `AppConfig` must survive a TOML round trip unchanged.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original, loaded);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.ai.debounce_ms, 1_000);
        assert_eq!(cfg.ai.timeout_secs, 20);
        assert_eq!(cfg.ai.sample_count, 1);
        assert_eq!(cfg.upload.max_file_bytes, 2 * 1024 * 1024);
        assert_eq!(cfg.voice.default_language.display_name, "Hindi");
        assert_eq!(cfg.voice.default_language.code, "hi");
        assert!(cfg.endpoints.upload_images.ends_with("/gcp-upload"));
    }

    /// Modified non-default values must survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.endpoints.generate_title = "https://ai.example.com/title".into();
        cfg.ai.debounce_ms = 500;
        cfg.ai.timeout_secs = 45;
        cfg.upload.max_file_bytes = 1024;
        cfg.voice.default_language = LanguageOption {
            display_name: "Tamil".into(),
            code: "ta".into(),
        };

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
    }
}
