//! Page fetching: retrieve raw HTML for the target URL.
//!
//! A failed page fetch is not an error for the run — it means no images are
//! discoverable, so the pipeline completes with an empty mapping. The cause
//! is logged here, at the point of occurrence, and `None` propagates up.

use tracing::{debug, warn};

/// Fetch the HTML body of a page.
///
/// Returns the body only on a success status; `None` on any transport error,
/// timeout, or non-success status. No retries — the page fetch is the cheap
/// first step and a flaky page is better surfaced than papered over.
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Option<String> {
    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!("Error fetching content from {}: {}", url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        warn!("Fetch of {} returned HTTP {}", url, response.status());
        return None;
    }

    match response.text().await {
        Ok(body) => {
            debug!("Fetched {} ({} bytes)", url, body.len());
            Some(body)
        }
        Err(e) => {
            warn!("Error reading body from {}: {}", url, e);
            None
        }
    }
}

/// Check if the input string looks like an HTTP(S) URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}
