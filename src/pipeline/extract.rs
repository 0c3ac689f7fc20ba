//! Image-link extraction: parse page HTML into asset-host image references.
//!
//! Only `img` elements whose `src` begins with the configured asset-host
//! prefix survive the scan — that single filter is what keeps navigation
//! chrome, icons, and third-party widgets out of the download fan-out.
//! Protocol-relative sources (`//upload.…`) are rewritten to `https://` so
//! downstream stages only ever see absolute URLs.

use crate::output::ImageRef;
use scraper::{Html, Selector};
use tracing::debug;

/// Alt-text used when an `img` element carries no `alt` attribute.
pub const NO_DESCRIPTION: &str = "No description available";

/// Extract asset-host image references from page HTML, in document order.
///
/// No deduplication: a page that embeds the same image twice yields two
/// references, each processed independently.
pub fn extract_images(html: &str, asset_host: &str) -> Vec<ImageRef> {
    let document = Html::parse_document(html);
    // "img" is a valid selector; parse can only fail on malformed input.
    let selector = Selector::parse("img").expect("static selector");

    let mut images = Vec::new();
    for element in document.select(&selector) {
        let Some(src) = element.value().attr("src") else {
            continue;
        };
        if !src.starts_with(asset_host) {
            continue;
        }
        let url = if src.starts_with("//") {
            format!("https:{src}")
        } else {
            src.to_string()
        };
        // Default only when the attribute is absent; an explicit empty alt
        // is kept as-is.
        let alt_text = element
            .value()
            .attr("alt")
            .unwrap_or(NO_DESCRIPTION)
            .to_string();
        images.push(ImageRef { url, alt_text });
    }

    debug!("Extracted {} asset-host images", images.len());
    images
}

/// The base filename of an image URL (final path segment).
///
/// Used both as the staged file name and as the metadata-source lookup key.
/// Percent-encoding is kept as-is: the metadata sources resolve the encoded
/// form, and it keeps staged names filesystem-safe.
pub fn url_basename(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ASSET_HOST;

    #[test]
    fn extracts_matching_image_with_alt() {
        let html = r#"<html><body>
            <img src="//upload.wikimedia.org/x/y/pic.jpg" alt="A dog">
        </body></html>"#;
        let images = extract_images(html, DEFAULT_ASSET_HOST);
        assert_eq!(
            images,
            vec![ImageRef {
                url: "https://upload.wikimedia.org/x/y/pic.jpg".to_string(),
                alt_text: "A dog".to_string(),
            }]
        );
    }

    #[test]
    fn ignores_non_matching_hosts() {
        let html = r#"
            <img src="//upload.wikimedia.org/a.jpg" alt="keep">
            <img src="https://cdn.example.com/logo.png" alt="drop">
            <img src="/static/icon.svg" alt="drop">
            <img alt="no src at all">
        "#;
        let images = extract_images(html, DEFAULT_ASSET_HOST);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].alt_text, "keep");
    }

    #[test]
    fn missing_alt_gets_default() {
        let html = r#"<img src="//upload.wikimedia.org/b.png">"#;
        let images = extract_images(html, DEFAULT_ASSET_HOST);
        assert_eq!(images[0].alt_text, NO_DESCRIPTION);
    }

    #[test]
    fn preserves_document_order_and_duplicates() {
        let html = r#"
            <img src="//upload.wikimedia.org/1.jpg" alt="one">
            <img src="//upload.wikimedia.org/2.jpg" alt="two">
            <img src="//upload.wikimedia.org/1.jpg" alt="one again">
        "#;
        let images = extract_images(html, DEFAULT_ASSET_HOST);
        let alts: Vec<_> = images.iter().map(|i| i.alt_text.as_str()).collect();
        assert_eq!(alts, vec!["one", "two", "one again"]);
    }

    #[test]
    fn custom_prefix_matches_absolute_urls() {
        let html = r#"<img src="https://assets.example.org/p/q.jpg" alt="x">"#;
        let images = extract_images(html, "https://assets.example.org");
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "https://assets.example.org/p/q.jpg");
    }

    #[test]
    fn basename_of_url() {
        assert_eq!(
            url_basename("https://upload.wikimedia.org/x/y/pic.jpg"),
            "pic.jpg"
        );
        assert_eq!(url_basename("pic.jpg"), "pic.jpg");
        assert_eq!(
            url_basename("https://upload.wikimedia.org/a/Name%2C_2001.jpg"),
            "Name%2C_2001.jpg"
        );
    }
}
