//! Batch image storage seam.
//!
//! [`ImageStore`] abstracts the batch upload endpoint so the manager can be
//! tested without a network.  [`HttpImageStore`] is the production
//! implementation: one multipart POST with every accepted file under the
//! `images` part name, parsed into the endpoint's `urls` list.

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use super::{PendingFile, UploadError};
use crate::config::{EndpointsConfig, UploadConfig};
use crate::state::ImageRef;

// ---------------------------------------------------------------------------
// ImageStore trait
// ---------------------------------------------------------------------------

/// Async interface over the batch upload endpoint.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn ImageStore>`).
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload `files` as one batch; returns the stored refs in upload order.
    async fn upload_batch(&self, files: Vec<PendingFile>) -> Result<Vec<ImageRef>, UploadError>;
}

// Compile-time assertion: Box<dyn ImageStore> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn ImageStore>) {}
};

// ---------------------------------------------------------------------------
// HttpImageStore
// ---------------------------------------------------------------------------

/// Wire shape of the batch upload response.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    urls: Vec<ImageRef>,
}

/// Production store that POSTs one multipart request to the configured
/// batch endpoint.
pub struct HttpImageStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpImageStore {
    /// Build a store from configuration.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `upload.timeout_secs`.
    pub fn from_config(endpoints: &EndpointsConfig, upload: &UploadConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(upload.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint: endpoints.upload_images.clone(),
        }
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn upload_batch(&self, files: Vec<PendingFile>) -> Result<Vec<ImageRef>, UploadError> {
        let mut form = multipart::Form::new();
        for file in files {
            let part = multipart::Part::bytes(file.bytes)
                .file_name(file.name)
                .mime_str(&file.mime)
                .map_err(|e| UploadError::Request(format!("mime: {e}")))?;
            form = form.part("images", part);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let parsed = response
            .json::<UploadResponse>()
            .await
            .map_err(|e| UploadError::Parse(e.to_string()))?;
        Ok(parsed.urls)
    }
}

// ---------------------------------------------------------------------------
// MockStore  (test-only)
// ---------------------------------------------------------------------------

/// Test double that returns one fabricated ref per file, or a fixed error.
#[cfg(test)]
pub struct MockStore {
    outcome: Result<(), UploadError>,
    batches: std::sync::Mutex<Vec<Vec<String>>>,
}

#[cfg(test)]
impl MockStore {
    /// Every batch succeeds; each file maps to `https://cdn/<name>`.
    pub fn ok() -> Self {
        Self {
            outcome: Ok(()),
            batches: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Every batch fails with `error`.
    pub fn failing(error: UploadError) -> Self {
        Self {
            outcome: Err(error),
            batches: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// File names of every batch received, in call order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl ImageStore for MockStore {
    async fn upload_batch(&self, files: Vec<PendingFile>) -> Result<Vec<ImageRef>, UploadError> {
        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        self.batches.lock().unwrap().push(names.clone());

        self.outcome.clone()?;
        Ok(names
            .into_iter()
            .map(|name| ImageRef {
                url: format!("https://cdn/{name}"),
                name,
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_builds_without_panic() {
        let _store =
            HttpImageStore::from_config(&EndpointsConfig::default(), &UploadConfig::default());
    }

    #[test]
    fn store_is_object_safe() {
        let store: Box<dyn ImageStore> = Box::new(HttpImageStore::from_config(
            &EndpointsConfig::default(),
            &UploadConfig::default(),
        ));
        drop(store);
    }

    #[test]
    fn upload_response_parses_url_list() {
        let json = r#"{ "urls": [ { "url": "https://cdn/a.png", "name": "a.png" } ] }"#;
        let parsed: UploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.urls.len(), 1);
        assert_eq!(parsed.urls[0].name, "a.png");
    }

    #[tokio::test]
    async fn mock_store_fabricates_refs() {
        let store = MockStore::ok();
        let refs = store
            .upload_batch(vec![PendingFile::new("a.png", "image/png", vec![0u8; 4])])
            .await
            .unwrap();
        assert_eq!(refs[0].url, "https://cdn/a.png");
        assert_eq!(store.batches(), vec![vec!["a.png".to_string()]]);
    }
}
