//! Output types: the caption mapping, per-image outcomes, and run statistics.
//!
//! The caption mapping in [`CaptionOutput::captions`] is the pipeline's sole
//! contract artifact: one entry per successfully captioned image, keyed by
//! image URL. Everything else here exists so callers can audit partial runs —
//! every image that reached the staging area appears in
//! [`CaptionOutput::images`] exactly once, with either a caption or the
//! reason it was dropped.

use crate::error::ImageError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An image discovered on the page: URL plus its alt-text description.
///
/// Produced by the extractor in document order; duplicates are possible and
/// are processed independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Absolute image URL (protocol-relative sources already rewritten).
    pub url: String,
    /// The `alt` attribute, or "No description available" when absent.
    pub alt_text: String,
}

/// Descriptive metadata resolved for an image from a candidate source page.
///
/// Never null-valued: resolution failure yields the defaults, so callers may
/// always read both fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub title: String,
    pub description: String,
}

impl Default for ImageMetadata {
    fn default() -> Self {
        Self {
            title: "No title".to_string(),
            description: "No description available".to_string(),
        }
    }
}

/// Which captioning strategy the selector chose for an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptionerChoice {
    /// Vision-model-backed path: encode the image, POST to the endpoint.
    Rich,
    /// Template path: format the metadata, no network call.
    Simple,
}

/// The record of one image's trip through the pipeline.
///
/// Always present for every image whose download was attempted — success,
/// failed download, and failed caption all produce exactly one outcome, so
/// no staged asset is ever silently lost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageOutcome {
    /// Image URL (the key this outcome would have in the caption mapping).
    pub url: String,
    /// Alt-text carried from extraction.
    pub alt_text: String,
    /// Strategy chosen by the selector; `None` when the image never got that
    /// far (download failed).
    pub choice: Option<CaptionerChoice>,
    /// The generated caption, when one was produced.
    pub caption: Option<String>,
    /// Why this image is absent from the caption mapping, when it is.
    pub error: Option<ImageError>,
    /// Wall-clock time spent on this image's caption step.
    pub duration_ms: u64,
}

/// Aggregate statistics for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// `img` elements that matched the asset-host prefix.
    pub discovered: usize,
    /// Images staged successfully.
    pub downloaded: usize,
    /// Images whose download failed.
    pub failed_downloads: usize,
    /// Images that produced a caption.
    pub captioned: usize,
    /// Staged images dropped with a logged reason.
    pub dropped: usize,
    /// Captions produced by the model-backed path.
    pub rich: usize,
    /// Captions produced by the template path.
    pub simple: usize,
    /// Time spent in the download fan-out.
    pub download_ms: u64,
    /// Time spent in the serial metadata/caption loop.
    pub caption_ms: u64,
    /// End-to-end run time.
    pub total_ms: u64,
}

/// Result of a full captioning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptionOutput {
    /// Image URL → caption. Entries exist only for captioned images; failed
    /// downloads and failed captions are omitted, never placeholders.
    pub captions: HashMap<String, String>,
    /// Per-image audit trail, in processing order.
    pub images: Vec<ImageOutcome>,
    /// Aggregate run statistics.
    pub stats: RunStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_default_values() {
        let meta = ImageMetadata::default();
        assert_eq!(meta.title, "No title");
        assert_eq!(meta.description, "No description available");
    }

    #[test]
    fn output_serialises() {
        let mut output = CaptionOutput::default();
        output
            .captions
            .insert("https://upload.wikimedia.org/a/pic.jpg".into(), "A dog".into());
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("pic.jpg"));
        assert!(json.contains("A dog"));
    }
}
