//! Metadata resolution: look up an image's title and description from
//! ordered candidate source pages.
//!
//! Each candidate base URL gets the image's base filename appended; the
//! first page that answers with a success status is parsed and wins. A
//! commons-style file page is tried before the encyclopedia-style one
//! because it carries richer descriptions for media files.
//!
//! Resolution can never fail from the caller's perspective: exhausted
//! candidates, transport errors, and parse misses all collapse to
//! [`ImageMetadata::default()`], logged here.

use crate::output::ImageMetadata;
use scraper::{Html, Selector};
use tracing::{debug, warn};

/// Resolve metadata for an image by its base filename.
///
/// Tries each source in order; the first page answering with a success
/// status is parsed and wins, even when that page yields neither a title
/// nor a description. Returns the defaults on exhaustion.
pub async fn resolve_metadata(
    client: &reqwest::Client,
    filename: &str,
    sources: &[String],
) -> ImageMetadata {
    for base_url in sources {
        let page_url = format!("{base_url}{filename}");
        let response = match client.get(&page_url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Error gathering metadata from {}: {}", page_url, e);
                continue;
            }
        };
        if !response.status().is_success() {
            debug!("Metadata source {} returned HTTP {}", page_url, response.status());
            continue;
        }
        match response.text().await {
            Ok(html) => {
                let meta = parse_metadata(&html);
                debug!("Resolved metadata for {} from {}: '{}'", filename, page_url, meta.title);
                return meta;
            }
            Err(e) => {
                warn!("Error reading metadata page {}: {}", page_url, e);
                continue;
            }
        }
    }
    debug!("No metadata source answered for {}; using defaults", filename);
    ImageMetadata::default()
}

/// Parse a file page into metadata.
///
/// Title: first `h1#firstHeading` text. Description: first paragraph inside
/// a `div.description` container. Either missing element falls back to the
/// corresponding default, so callers may always read both fields.
pub fn parse_metadata(html: &str) -> ImageMetadata {
    let document = Html::parse_document(html);
    let title_sel = Selector::parse("h1#firstHeading").expect("static selector");
    let desc_sel = Selector::parse("div.description p").expect("static selector");

    let defaults = ImageMetadata::default();

    let title = document
        .select(&title_sel)
        .next()
        .map(|el| collect_text(&el))
        .filter(|t| !t.is_empty())
        .unwrap_or(defaults.title);

    let description = document
        .select(&desc_sel)
        .next()
        .map(|el| collect_text(&el))
        .filter(|d| !d.is_empty())
        .unwrap_or(defaults.description);

    ImageMetadata { title, description }
}

fn collect_text(element: &scraper::ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_title_and_description() {
        let html = r#"<html><body>
            <h1 id="firstHeading">File:Pic.jpg</h1>
            <div class="description">
                <p>A detailed photograph of a suspension bridge.</p>
                <p>Second paragraph is ignored.</p>
            </div>
        </body></html>"#;
        let meta = parse_metadata(html);
        assert_eq!(meta.title, "File:Pic.jpg");
        assert_eq!(meta.description, "A detailed photograph of a suspension bridge.");
    }

    #[test]
    fn missing_elements_fall_back_to_defaults() {
        let meta = parse_metadata("<html><body><p>nothing useful</p></body></html>");
        assert_eq!(meta, ImageMetadata::default());
    }

    #[test]
    fn missing_description_keeps_parsed_title() {
        let html = r#"<h1 id="firstHeading">File:Pic.jpg</h1>"#;
        let meta = parse_metadata(html);
        assert_eq!(meta.title, "File:Pic.jpg");
        assert_eq!(meta.description, "No description available");
    }

    #[test]
    fn description_container_without_paragraph_falls_back() {
        let html = r#"
            <h1 id="firstHeading">File:Pic.jpg</h1>
            <div class="description"><span>inline only</span></div>
        "#;
        let meta = parse_metadata(html);
        assert_eq!(meta.description, "No description available");
    }

    #[test]
    fn nested_markup_in_paragraph_is_flattened() {
        let html = r#"
            <div class="description"><p>A <b>technical</b> diagram of a <i>turbine</i>.</p></div>
        "#;
        let meta = parse_metadata(html);
        assert_eq!(meta.description, "A technical diagram of a turbine.");
    }
}
