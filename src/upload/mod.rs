//! Image upload subsystem.
//!
//! This module provides:
//! * [`UploadManager`] — validates a batch of files, uploads the accepted
//!   ones in one multipart request, and merges the resulting URLs into form
//!   state and the local preview list.
//! * [`ImageStore`] — async trait over the batch upload endpoint.
//! * [`HttpImageStore`] — production `ImageStore` over HTTP multipart.
//! * [`UploadError`] / [`PendingFile`] — error taxonomy and pending-file ref.
//!
//! Validation is per-file: a file that is not an image, or that exceeds the
//! configured size cap, is rejected with a warning and excluded; its
//! siblings in the same batch still upload.  The post-upload merge is
//! all-or-nothing — a failed batch drops every file.

pub mod manager;
pub mod store;

pub use manager::UploadManager;
pub use store::{HttpImageStore, ImageStore};

use thiserror::Error;

// ---------------------------------------------------------------------------
// UploadError
// ---------------------------------------------------------------------------

/// Errors raised by validation or the batch upload call.
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// The file's MIME type is not `image/*`.
    #[error("{name}: only image files can be uploaded")]
    NotAnImage { name: String },

    /// The file exceeds the per-file size cap.
    #[error("{name}: file is larger than {max_bytes} bytes")]
    TooLarge { name: String, max_bytes: u64 },

    /// HTTP transport or connection error, or a non-success status.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The batch request did not complete within the configured timeout.
    #[error("upload timed out")]
    Timeout,

    /// The response could not be parsed as the expected URL list.
    #[error("failed to parse upload response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UploadError::Timeout
        } else {
            UploadError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// PendingFile
// ---------------------------------------------------------------------------

/// One file picked by the user, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    /// Original file name.
    pub name: String,
    /// MIME type reported by the picker (e.g. `image/png`).
    pub mime: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl PendingFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Split a batch into accepted files and per-file rejections.
///
/// Order is preserved within the accepted set.  Rejections never abort
/// siblings.
pub fn validate_batch(
    files: Vec<PendingFile>,
    max_bytes: u64,
) -> (Vec<PendingFile>, Vec<UploadError>) {
    let mut accepted = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();

    for file in files {
        if !file.mime.starts_with("image/") {
            rejected.push(UploadError::NotAnImage {
                name: file.name.clone(),
            });
            continue;
        }
        if file.bytes.len() as u64 > max_bytes {
            rejected.push(UploadError::TooLarge {
                name: file.name.clone(),
                max_bytes,
            });
            continue;
        }
        accepted.push(file);
    }

    (accepted, rejected)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
