//! Error types for the webcap library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`WebcapError`] — **Fatal**: the run cannot proceed at all (invalid
//!   page URL, bad configuration, staging directory could not be created).
//!   Returned as `Err(WebcapError)` from the top-level `caption_*` functions.
//!
//! * [`ImageError`] — **Non-fatal**: a single image failed (download error,
//!   model endpoint rejection) but the rest of the page is fine. Stored
//!   inside [`crate::output::ImageOutcome`] so callers can inspect partial
//!   success rather than losing the whole page to one bad image.
//!
//! Page-fetch failures, metadata-source failures, and HTML-parse failures are
//! deliberately NOT errors at all: they recover locally to an empty caption
//! set or default metadata, logged at the point of occurrence.

use thiserror::Error;

/// All fatal errors returned by the webcap library.
///
/// Image-level failures use [`ImageError`] and are stored in
/// [`crate::output::ImageOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum WebcapError {
    /// The input string is not a valid HTTP/HTTPS URL.
    #[error("Invalid page URL '{input}': expected an http:// or https:// URL")]
    InvalidUrl { input: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The staging directory could not be created.
    #[error("Failed to create staging directory: {source}")]
    Staging {
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single image.
///
/// Stored alongside [`crate::output::ImageOutcome`] when an image fails.
/// The overall run continues; the image's URL is simply absent from the
/// final caption mapping.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ImageError {
    /// Image download failed (transport error or non-success status).
    #[error("Download failed for '{url}': {detail}")]
    Download { url: String, detail: String },

    /// The image body downloaded but could not be written to staging.
    #[error("Failed to stage '{url}': {detail}")]
    Stage { url: String, detail: String },

    /// The staged image could not be read back or base64-encoded.
    #[error("Failed to encode staged image for '{url}': {detail}")]
    Encode { url: String, detail: String },

    /// The vision endpoint returned a non-success status.
    #[error("Model endpoint returned HTTP {status} for '{url}': {body}")]
    Model {
        url: String,
        status: u16,
        body: String,
    },

    /// The vision endpoint was unreachable after all retries.
    #[error("Model call failed for '{url}' after {retries} retries: {detail}")]
    ModelTransport {
        url: String,
        retries: u32,
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_display() {
        let e = WebcapError::InvalidUrl {
            input: "ftp://nope".into(),
        };
        assert!(e.to_string().contains("ftp://nope"));
    }

    #[test]
    fn model_error_display() {
        let e = ImageError::Model {
            url: "https://upload.wikimedia.org/a/pic.jpg".into(),
            status: 500,
            body: "overloaded".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("500"), "got: {msg}");
        assert!(msg.contains("overloaded"));
    }

    #[test]
    fn model_transport_display() {
        let e = ImageError::ModelTransport {
            url: "https://upload.wikimedia.org/a/pic.jpg".into(),
            retries: 2,
            detail: "connection refused".into(),
        };
        assert!(e.to_string().contains("2 retries"));
    }
}
