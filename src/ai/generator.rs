//! Core `ContentGenerator` trait and `HttpContentGenerator` implementation.
//!
//! `HttpContentGenerator` calls the remote generation endpoints described by
//! [`EndpointsConfig`]; nothing is hardcoded.  Every request carries the
//! per-request timeout from [`AiConfig::timeout_secs`], so a hung backend
//! surfaces as [`AiError::Timeout`] instead of leaving the pipeline loading
//! forever.

use async_trait::async_trait;
use thiserror::Error;

use crate::ai::prompts;
use crate::ai::LanguageOption;
use crate::config::{AiConfig, EndpointsConfig};

// ---------------------------------------------------------------------------
// AiError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the generation endpoints.
#[derive(Debug, Clone, Error)]
pub enum AiError {
    /// HTTP transport or connection error, or a non-success status.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The response parsed but contained no usable content.
    #[error("response contained no usable content")]
    EmptyResponse,
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AiError::Timeout
        } else {
            AiError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// GeneratedImage
// ---------------------------------------------------------------------------

/// Payload of a successful image generate/edit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Storage object name; the edit endpoint takes it to locate the source.
    pub name: String,
    /// Signed URL where the rendered image can be viewed.
    pub url: String,
}

// ---------------------------------------------------------------------------
// ContentGenerator trait
// ---------------------------------------------------------------------------

/// Async interface over the content-generation backends.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn ContentGenerator>`).
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Fetch the raw language list (duplicates included; callers dedupe).
    async fn list_languages(&self) -> Result<Vec<LanguageOption>, AiError>;

    /// Detect the language of `text`; returns the first detection's code.
    async fn detect_language(&self, text: &str) -> Result<String, AiError>;

    /// Generate a product title from `text`.
    async fn generate_title(&self, text: &str, language: &str) -> Result<String, AiError>;

    /// Generate a product description from `text`.  `concise` selects the
    /// short 2-3 point form used for summary fields.
    async fn generate_description(
        &self,
        text: &str,
        language: &str,
        concise: bool,
    ) -> Result<String, AiError>;

    /// Generate a product image from `text`.
    async fn generate_image(&self, text: &str, language: &str) -> Result<GeneratedImage, AiError>;

    /// Re-render a previously generated image (`file_name`) per `text`.
    async fn edit_image(
        &self,
        text: &str,
        language: &str,
        file_name: &str,
    ) -> Result<GeneratedImage, AiError>;
}

// Compile-time assertion: Box<dyn ContentGenerator> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn ContentGenerator>) {}
};

// ---------------------------------------------------------------------------
// HttpContentGenerator
// ---------------------------------------------------------------------------

/// Production backend that calls the configured endpoints over HTTP.
pub struct HttpContentGenerator {
    client: reqwest::Client,
    endpoints: EndpointsConfig,
    ai: AiConfig,
}

impl HttpContentGenerator {
    /// Build a generator from configuration.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `ai.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(endpoints: &EndpointsConfig, ai: &AiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(ai.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoints: endpoints.clone(),
            ai: ai.clone(),
        }
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, AiError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        let json = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;
        Ok(json)
    }

    /// POST to an image endpoint — adds the `samplecount` header and parses
    /// the first `{signedUri, fileName}` result.
    async fn post_image(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<GeneratedImage, AiError> {
        let response = self
            .client
            .post(url)
            .header("samplecount", self.ai.sample_count.to_string())
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        let json = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;

        let first = &json["results"][0];
        let uri = first["signedUri"].as_str().ok_or(AiError::EmptyResponse)?;
        let name = first["fileName"].as_str().ok_or(AiError::EmptyResponse)?;
        Ok(GeneratedImage {
            name: name.to_string(),
            url: uri.to_string(),
        })
    }

    fn translated_content(json: &serde_json::Value) -> Result<String, AiError> {
        let content = json["results"]["translatedContent"]
            .as_str()
            .ok_or(AiError::EmptyResponse)?
            .trim()
            .to_string();
        if content.is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(content)
    }
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    async fn list_languages(&self) -> Result<Vec<LanguageOption>, AiError> {
        let response = self
            .client
            .get(&self.endpoints.language_list)
            .send()
            .await?
            .error_for_status()?;
        let json = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;

        let results = json["results"].as_array().ok_or(AiError::EmptyResponse)?;
        let options = results
            .iter()
            .filter_map(|entry| {
                let name = entry["displayName"].as_str()?;
                let code = entry["languageCode"].as_str()?;
                Some(LanguageOption::new(name, code))
            })
            .collect();
        Ok(options)
    }

    async fn detect_language(&self, text: &str) -> Result<String, AiError> {
        let body = serde_json::json!([text]);
        let json = self.post_json(&self.endpoints.detect_language, &body).await?;

        json["results"][0]["detections"][0]["languageCode"]
            .as_str()
            .map(str::to_string)
            .ok_or(AiError::EmptyResponse)
    }

    async fn generate_title(&self, text: &str, language: &str) -> Result<String, AiError> {
        let body = serde_json::json!({
            "text":     text,
            "language": language,
            "prompt":   prompts::TITLE_CONTEXT,
            "desc":     prompts::TITLE_FORMAT,
        });
        let json = self.post_json(&self.endpoints.generate_title, &body).await?;
        Self::translated_content(&json)
    }

    async fn generate_description(
        &self,
        text: &str,
        language: &str,
        concise: bool,
    ) -> Result<String, AiError> {
        let body = serde_json::json!({
            "text":     text,
            "language": language,
            "prompt":   prompts::description_context(concise),
        });
        let json = self
            .post_json(&self.endpoints.generate_description, &body)
            .await?;
        Self::translated_content(&json)
    }

    async fn generate_image(&self, text: &str, language: &str) -> Result<GeneratedImage, AiError> {
        let body = serde_json::json!({
            "text":      text,
            "language":  language,
            "prompt":    prompts::IMAGE_GENERATE_CONTEXT,
            "gcsbucket": self.ai.image_bucket,
        });
        self.post_image(&self.endpoints.generate_image, &body).await
    }

    async fn edit_image(
        &self,
        text: &str,
        language: &str,
        file_name: &str,
    ) -> Result<GeneratedImage, AiError> {
        let body = serde_json::json!({
            "text":      text,
            "language":  language,
            "prompt":    prompts::IMAGE_EDIT_CONTEXT,
            "gcsbucket": self.ai.image_bucket,
            "filename":  file_name,
        });
        self.post_image(&self.endpoints.edit_image, &body).await
    }
}

// ---------------------------------------------------------------------------
// MockGenerator  (test-only)
// ---------------------------------------------------------------------------

/// A test double with pre-configured responses and a call log.
///
/// Every method records its arguments so tests can assert how often — and
/// with what — the pipeline actually called out.
#[cfg(test)]
pub struct MockGenerator {
    inner: std::sync::Arc<MockInner>,
}

#[cfg(test)]
struct MockInner {
    languages: Result<Vec<LanguageOption>, AiError>,
    detect: Result<String, AiError>,
    title: Result<String, AiError>,
    description: Result<String, AiError>,
    image: Result<GeneratedImage, AiError>,
    edited: Result<GeneratedImage, AiError>,
    calls: std::sync::Mutex<Vec<MockCall>>,
}

/// One recorded backend call.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Languages,
    Detect(String),
    Title { text: String, language: String },
    Description { text: String, language: String, concise: bool },
    Image { text: String, language: String },
    Edit { text: String, language: String, file_name: String },
}

#[cfg(test)]
impl MockGenerator {
    /// All operations succeed with fixed payloads.
    pub fn ok() -> Self {
        Self {
            inner: std::sync::Arc::new(MockInner {
                languages: Ok(vec![
                    LanguageOption::new("Hindi", "hi"),
                    LanguageOption::new("English", "en"),
                ]),
                detect: Ok("hi".into()),
                title: Ok("Generated Title".into()),
                description: Ok("Generated Description".into()),
                image: Ok(GeneratedImage {
                    name: "gen-1.png".into(),
                    url: "https://cdn/gen-1.png".into(),
                }),
                edited: Ok(GeneratedImage {
                    name: "gen-2.png".into(),
                    url: "https://cdn/gen-2.png".into(),
                }),
                calls: std::sync::Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn with_languages(mut self, languages: Result<Vec<LanguageOption>, AiError>) -> Self {
        self.inner_mut().languages = languages;
        self
    }

    pub fn with_detect(mut self, detect: Result<String, AiError>) -> Self {
        self.inner_mut().detect = detect;
        self
    }

    pub fn with_title(mut self, title: Result<String, AiError>) -> Self {
        self.inner_mut().title = title;
        self
    }

    pub fn with_description(mut self, description: Result<String, AiError>) -> Self {
        self.inner_mut().description = description;
        self
    }

    pub fn with_image(mut self, image: Result<GeneratedImage, AiError>) -> Self {
        self.inner_mut().image = image;
        self
    }

    pub fn with_edited(mut self, edited: Result<GeneratedImage, AiError>) -> Self {
        self.inner_mut().edited = edited;
        self
    }

    fn inner_mut(&mut self) -> &mut MockInner {
        std::sync::Arc::get_mut(&mut self.inner).expect("mock not shared yet")
    }

    /// Snapshot of every recorded call, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.inner.calls.lock().unwrap().clone()
    }

    /// Cheap clone sharing the same call log.
    pub fn handle(&self) -> Self {
        Self {
            inner: std::sync::Arc::clone(&self.inner),
        }
    }

    fn record(&self, call: MockCall) {
        self.inner.calls.lock().unwrap().push(call);
    }
}

#[cfg(test)]
#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn list_languages(&self) -> Result<Vec<LanguageOption>, AiError> {
        self.record(MockCall::Languages);
        self.inner.languages.clone()
    }

    async fn detect_language(&self, text: &str) -> Result<String, AiError> {
        self.record(MockCall::Detect(text.to_string()));
        self.inner.detect.clone()
    }

    async fn generate_title(&self, text: &str, language: &str) -> Result<String, AiError> {
        self.record(MockCall::Title {
            text: text.to_string(),
            language: language.to_string(),
        });
        self.inner.title.clone()
    }

    async fn generate_description(
        &self,
        text: &str,
        language: &str,
        concise: bool,
    ) -> Result<String, AiError> {
        self.record(MockCall::Description {
            text: text.to_string(),
            language: language.to_string(),
            concise,
        });
        self.inner.description.clone()
    }

    async fn generate_image(&self, text: &str, language: &str) -> Result<GeneratedImage, AiError> {
        self.record(MockCall::Image {
            text: text.to_string(),
            language: language.to_string(),
        });
        self.inner.image.clone()
    }

    async fn edit_image(
        &self,
        text: &str,
        language: &str,
        file_name: &str,
    ) -> Result<GeneratedImage, AiError> {
        self.record(MockCall::Edit {
            text: text.to_string(),
            language: language.to_string(),
            file_name: file_name.to_string(),
        });
        self.inner.edited.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_generator() -> HttpContentGenerator {
        HttpContentGenerator::from_config(&EndpointsConfig::default(), &AiConfig::default())
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _generator = make_generator();
    }

    /// Verify that `HttpContentGenerator` is usable as `dyn ContentGenerator`.
    #[test]
    fn generator_is_object_safe() {
        let generator: Box<dyn ContentGenerator> = Box::new(make_generator());
        drop(generator);
    }

    #[test]
    fn translated_content_rejects_missing_field() {
        let json = serde_json::json!({ "results": {} });
        assert!(matches!(
            HttpContentGenerator::translated_content(&json),
            Err(AiError::EmptyResponse)
        ));
    }

    #[test]
    fn translated_content_rejects_blank_string() {
        let json = serde_json::json!({ "results": { "translatedContent": "   " } });
        assert!(matches!(
            HttpContentGenerator::translated_content(&json),
            Err(AiError::EmptyResponse)
        ));
    }

    #[test]
    fn translated_content_trims() {
        let json = serde_json::json!({ "results": { "translatedContent": "  Steel Bottle \n" } });
        assert_eq!(
            HttpContentGenerator::translated_content(&json).unwrap(),
            "Steel Bottle"
        );
    }

    #[tokio::test]
    async fn mock_records_calls_in_order() {
        let generator = MockGenerator::ok();
        let _ = generator.detect_language("hello").await;
        let _ = generator.generate_title("hello", "en").await;

        let calls = generator.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], MockCall::Detect("hello".into()));
        assert!(matches!(calls[1], MockCall::Title { .. }));
    }

    #[tokio::test]
    async fn mock_failure_configuration() {
        let generator = MockGenerator::ok().with_detect(Err(AiError::Timeout));
        assert!(matches!(
            generator.detect_language("x").await,
            Err(AiError::Timeout)
        ));
    }
}
