//! Configuration module for the form assist engine.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem
//! (remote endpoints, AI pipeline, uploads, voice), `AppPaths` for
//! cross-platform config directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AiConfig, AppConfig, EndpointsConfig, UploadConfig, VoiceConfig};
