//! Captioner selection: the decision tree that routes an image to the
//! model-backed or template-backed strategy.
//!
//! The rules form a policy contract, evaluated in fixed priority order with
//! the first match winning. Reordering them changes observable behaviour,
//! so any change here is a versioned policy change, not a refactor:
//!
//! 1. empty/whitespace description        → Rich
//! 2. description shorter than threshold  → Rich
//! 3. image at least min_width×min_height → Rich
//! 4. description contains a keyword      → Rich
//! 5. otherwise                           → Simple
//!
//! The function is pure: identical inputs always produce the identical
//! choice, with no hidden state and no memoisation. Resolution probing is
//! the caller's job (a header read on the staged file); a failed probe
//! arrives as `None`, which simply means rule 3 cannot fire.

use crate::config::CaptionConfig;
use crate::output::{CaptionerChoice, ImageMetadata};
use std::path::Path;
use tracing::debug;

/// Pick the captioning strategy for one image.
pub fn select_captioner(
    metadata: &ImageMetadata,
    dimensions: Option<(u32, u32)>,
    config: &CaptionConfig,
) -> CaptionerChoice {
    let description = &metadata.description;

    if description.trim().is_empty() {
        debug!("Description unavailable; choosing rich captioner");
        return CaptionerChoice::Rich;
    }

    // Character count, not byte length: the threshold is a prose-length
    // heuristic and must not shift for non-ASCII descriptions.
    if description.chars().count() < config.min_description_len {
        debug!("Description below length threshold; choosing rich captioner");
        return CaptionerChoice::Rich;
    }

    if let Some((width, height)) = dimensions {
        if width >= config.min_width && height >= config.min_height {
            debug!("High-resolution image ({}x{}); choosing rich captioner", width, height);
            return CaptionerChoice::Rich;
        }
    }

    let lowered = description.to_lowercase();
    if config.complex_keywords.iter().any(|k| lowered.contains(k)) {
        debug!("Description matches complex-content keyword; choosing rich captioner");
        return CaptionerChoice::Rich;
    }

    debug!("No rich-caption rule fired; choosing simple captioner");
    CaptionerChoice::Simple
}

/// Probe the pixel dimensions of a staged image file.
///
/// Reads only the image header — no full decode, no network. Any failure
/// (missing file, unsupported or truncated format) yields `None`, which the
/// selector treats as "not high resolution" rather than an error.
pub fn probe_resolution(path: &Path) -> Option<(u32, u32)> {
    match image::image_dimensions(path) {
        Ok(dims) => Some(dims),
        Err(e) => {
            debug!("Could not probe resolution of {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CaptionConfig {
        CaptionConfig::default()
    }

    fn meta(description: &str) -> ImageMetadata {
        ImageMetadata {
            title: "Pic".to_string(),
            description: description.to_string(),
        }
    }

    /// A description long enough that rule 2 never fires, with no keywords.
    fn long_plain_description() -> String {
        "A photo of a park. ".repeat(6).trim_end().to_string()
    }

    #[test]
    fn empty_description_is_rich_regardless_of_size() {
        let m = meta("");
        assert_eq!(select_captioner(&m, Some((10, 10)), &config()), CaptionerChoice::Rich);
        assert_eq!(select_captioner(&m, None, &config()), CaptionerChoice::Rich);
    }

    #[test]
    fn whitespace_description_is_rich() {
        assert_eq!(select_captioner(&meta("   \t "), None, &config()), CaptionerChoice::Rich);
    }

    #[test]
    fn short_description_is_rich() {
        let m = meta(&"x".repeat(99));
        assert_eq!(select_captioner(&m, None, &config()), CaptionerChoice::Rich);
    }

    #[test]
    fn length_boundary_is_strict() {
        // Exactly at the threshold the rule must NOT fire.
        let at = meta(&"a".repeat(100));
        assert_eq!(select_captioner(&at, None, &config()), CaptionerChoice::Simple);
        let below = meta(&"a".repeat(99));
        assert_eq!(select_captioner(&below, None, &config()), CaptionerChoice::Rich);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 100 two-byte characters: 200 bytes but exactly at the char threshold.
        let m = meta(&"é".repeat(100));
        assert_eq!(select_captioner(&m, None, &config()), CaptionerChoice::Simple);
    }

    #[test]
    fn high_resolution_is_rich() {
        let m = meta(&long_plain_description());
        assert_eq!(select_captioner(&m, Some((800, 600)), &config()), CaptionerChoice::Rich);
        assert_eq!(select_captioner(&m, Some((1920, 1080)), &config()), CaptionerChoice::Rich);
    }

    #[test]
    fn one_dimension_below_threshold_is_not_high_resolution() {
        let m = meta(&long_plain_description());
        assert_eq!(select_captioner(&m, Some((800, 599)), &config()), CaptionerChoice::Simple);
        assert_eq!(select_captioner(&m, Some((799, 600)), &config()), CaptionerChoice::Simple);
    }

    #[test]
    fn failed_probe_does_not_fire_resolution_rule() {
        let m = meta(&long_plain_description());
        assert_eq!(select_captioner(&m, None, &config()), CaptionerChoice::Simple);
    }

    #[test]
    fn keyword_match_is_rich() {
        let description = format!(
            "A detailed technical diagram of {}",
            "the cooling assembly and its many subcomponents. ".repeat(2)
        );
        assert!(description.chars().count() >= 100);
        let m = meta(&description);
        assert_eq!(select_captioner(&m, Some((10, 10)), &config()), CaptionerChoice::Rich);
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let description = format!("MEDICAL imaging equipment in a hospital ward. {}", "x".repeat(80));
        let m = meta(&description);
        assert_eq!(select_captioner(&m, None, &config()), CaptionerChoice::Rich);
    }

    #[test]
    fn plain_long_low_resolution_description_is_simple() {
        let m = meta(&long_plain_description());
        assert_eq!(select_captioner(&m, Some((640, 480)), &config()), CaptionerChoice::Simple);
    }

    #[test]
    fn deterministic_across_calls() {
        let m = meta(&long_plain_description());
        let first = select_captioner(&m, Some((640, 480)), &config());
        for _ in 0..10 {
            assert_eq!(select_captioner(&m, Some((640, 480)), &config()), first);
        }
    }

    #[test]
    fn probe_missing_file_is_none() {
        assert_eq!(probe_resolution(Path::new("/definitely/not/here.png")), None);
    }

    #[test]
    fn probe_reads_real_dimensions() {
        use image::{Rgba, RgbaImage};
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.png");
        RgbaImage::from_pixel(32, 16, Rgba([0, 0, 0, 255]))
            .save(&path)
            .unwrap();
        assert_eq!(probe_resolution(&path), Some((32, 16)));
    }
}
