//! Run orchestration: the fetch → extract → download → caption sequence.
//!
//! ## Failure philosophy
//!
//! Only setup problems (bad URL, bad config, no staging directory) are fatal.
//! Everything after that — unreachable page, failed downloads, missing
//! metadata, a rejecting model endpoint — degrades locally: the affected
//! image is dropped with a logged reason and the run always returns a
//! (possibly empty) caption mapping. Callers who care about partial failure
//! inspect [`CaptionOutput::images`] and [`CaptionOutput::stats`].

use crate::config::CaptionConfig;
use crate::error::WebcapError;
use crate::output::{CaptionOutput, CaptionerChoice, ImageOutcome, ImageRef};
use crate::pipeline::captioner::{Captioner, ModelCaptioner, TemplateCaptioner};
use crate::pipeline::download::{download_all, DownloadedAsset};
use crate::pipeline::extract::{extract_images, url_basename, NO_DESCRIPTION};
use crate::pipeline::fetch::{fetch_html, is_url};
use crate::pipeline::metadata::resolve_metadata;
use crate::pipeline::select::{probe_resolution, select_captioner};
use std::time::Instant;
use tempfile::TempDir;
use tracing::{info, warn};

/// Caption every asset-host image on a web page.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `page_url` — HTTP/HTTPS URL of the page to scan
/// * `config`   — Run configuration
///
/// # Returns
/// `Ok(CaptionOutput)` whenever the run itself could start, even if every
/// image failed (check `output.stats`). The mapping is empty when the page
/// was unreachable or carried no matching images.
///
/// # Errors
/// Returns `Err(WebcapError)` only for fatal setup errors: invalid URL,
/// HTTP client construction, or staging-directory creation.
pub async fn caption_page(
    page_url: impl AsRef<str>,
    config: &CaptionConfig,
) -> Result<CaptionOutput, WebcapError> {
    let total_start = Instant::now();
    let page_url = page_url.as_ref();
    if !is_url(page_url) {
        return Err(WebcapError::InvalidUrl {
            input: page_url.to_string(),
        });
    }
    info!("Starting caption run for {}", page_url);

    let client = build_client(config.download_timeout_secs)?;

    // ── Step 1: Fetch the page ───────────────────────────────────────────
    let Some(html) = fetch_html(&client, page_url).await else {
        info!("Page fetch failed; completing with an empty mapping");
        return Ok(CaptionOutput::default());
    };

    // ── Step 2: Extract image links ──────────────────────────────────────
    let refs = extract_images(&html, &config.asset_host);
    if refs.is_empty() {
        info!("No asset-host images found on {}", page_url);
        let mut output = CaptionOutput::default();
        output.stats.total_ms = total_start.elapsed().as_millis() as u64;
        return Ok(output);
    }
    info!("Discovered {} images", refs.len());

    run_pipeline(refs, config, client, total_start).await
}

/// Caption a single image URL directly, skipping page discovery.
///
/// The image is staged, its metadata resolved by base filename, and the
/// usual selection heuristic applies. Useful when the caller already knows
/// exactly which image it wants captioned.
pub async fn caption_image(
    image_url: impl AsRef<str>,
    config: &CaptionConfig,
) -> Result<CaptionOutput, WebcapError> {
    let total_start = Instant::now();
    let image_url = image_url.as_ref();
    if !is_url(image_url) {
        return Err(WebcapError::InvalidUrl {
            input: image_url.to_string(),
        });
    }
    info!("Starting single-image caption run for {}", image_url);

    let client = build_client(config.download_timeout_secs)?;
    let refs = vec![ImageRef {
        url: image_url.to_string(),
        alt_text: NO_DESCRIPTION.to_string(),
    }];

    run_pipeline(refs, config, client, total_start).await
}

/// Synchronous wrapper around [`caption_page`].
///
/// Creates a temporary tokio runtime internally.
pub fn caption_page_sync(
    page_url: impl AsRef<str>,
    config: &CaptionConfig,
) -> Result<CaptionOutput, WebcapError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| WebcapError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(caption_page(page_url, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn build_client(timeout_secs: u64) -> Result<reqwest::Client, WebcapError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| WebcapError::Internal(format!("Failed to build HTTP client: {e}")))
}

/// Download the references and caption each staged asset.
///
/// Shared by the page and single-image entry points; owns the staging
/// directory for exactly the duration of the run.
async fn run_pipeline(
    refs: Vec<ImageRef>,
    config: &CaptionConfig,
    client: reqwest::Client,
    total_start: Instant,
) -> Result<CaptionOutput, WebcapError> {
    // ── Step 3: Create the staging area ──────────────────────────────────
    let staging = TempDir::with_prefix("webcap-").map_err(|source| WebcapError::Staging { source })?;

    // ── Step 4: Concurrent download fan-out, fully joined ────────────────
    let download_start = Instant::now();
    let assets = download_all(&client, &refs, staging.path(), config.concurrency).await;
    let download_ms = download_start.elapsed().as_millis() as u64;
    let staged = assets.iter().filter(|a| a.local_path.is_some()).count();
    info!(
        "Downloaded {}/{} images in {}ms",
        staged,
        assets.len(),
        download_ms
    );

    // ── Step 5: Serial per-image caption loop ────────────────────────────
    // The model client gets its own (longer) timeout; vision calls are far
    // slower than asset GETs.
    let api_client = build_client(config.api_timeout_secs)?;
    let model_captioner = ModelCaptioner::new(api_client, config);
    let template_captioner = TemplateCaptioner::new(config.caption_template.clone());

    let caption_start = Instant::now();
    let mut output = CaptionOutput::default();
    output.stats.discovered = refs.len();
    output.stats.downloaded = staged;
    output.stats.failed_downloads = assets.len() - staged;

    for asset in assets {
        let outcome = caption_asset(
            &asset,
            &client,
            config,
            &model_captioner,
            &template_captioner,
        )
        .await;

        match (&outcome.caption, &outcome.choice) {
            (Some(caption), choice) => {
                output
                    .captions
                    .insert(outcome.url.clone(), caption.clone());
                output.stats.captioned += 1;
                match choice {
                    Some(CaptionerChoice::Rich) => output.stats.rich += 1,
                    Some(CaptionerChoice::Simple) => output.stats.simple += 1,
                    None => {}
                }
            }
            (None, _) if asset.local_path.is_some() => {
                // A staged asset with no caption is an explicit drop; the
                // reason is already logged and recorded in the outcome.
                output.stats.dropped += 1;
            }
            _ => {}
        }
        output.images.push(outcome);
    }

    output.stats.download_ms = download_ms;
    output.stats.caption_ms = caption_start.elapsed().as_millis() as u64;

    // ── Step 6: Remove the staging area, exactly once ────────────────────
    if let Err(e) = staging.close() {
        warn!("Failed to remove staging directory: {}", e);
    }

    output.stats.total_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Run complete: {}/{} images captioned ({} rich, {} simple), {}ms total",
        output.stats.captioned,
        output.stats.discovered,
        output.stats.rich,
        output.stats.simple,
        output.stats.total_ms
    );

    Ok(output)
}

/// Resolve, select, and caption a single staged asset.
///
/// Always returns an [`ImageOutcome`] — never propagates the error upward,
/// so one bad image cannot abort the run.
async fn caption_asset(
    asset: &DownloadedAsset,
    client: &reqwest::Client,
    config: &CaptionConfig,
    model_captioner: &ModelCaptioner,
    template_captioner: &TemplateCaptioner,
) -> ImageOutcome {
    let start = Instant::now();
    let url = asset.image.url.clone();

    let Some(path) = asset.local_path.as_deref() else {
        // Download already failed; carry its reason through to the outcome.
        return ImageOutcome {
            url,
            alt_text: asset.image.alt_text.clone(),
            choice: None,
            caption: None,
            error: asset.error.clone(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
    };

    let filename = url_basename(&url);
    let metadata = resolve_metadata(client, &filename, &config.metadata_sources).await;
    let dimensions = probe_resolution(path);
    let choice = select_captioner(&metadata, dimensions, config);

    let captioner: &dyn Captioner = match choice {
        CaptionerChoice::Rich => model_captioner,
        CaptionerChoice::Simple => template_captioner,
    };

    match captioner.caption(asset, &metadata).await {
        Ok(caption) => ImageOutcome {
            url,
            alt_text: asset.image.alt_text.clone(),
            choice: Some(choice),
            caption: Some(caption),
            error: None,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => {
            warn!("Dropping {} from the caption mapping: {}", url, e);
            ImageOutcome {
                url,
                alt_text: asset.image.alt_text.clone(),
                choice: Some(choice),
                caption: None,
                error: Some(e),
                duration_ms: start.elapsed().as_millis() as u64,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_non_http_input() {
        let config = CaptionConfig::default();
        let err = caption_page("not-a-url", &config).await.unwrap_err();
        assert!(matches!(err, WebcapError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn rejects_non_http_image_input() {
        let config = CaptionConfig::default();
        let err = caption_image("pic.jpg", &config).await.unwrap_err();
        assert!(matches!(err, WebcapError::InvalidUrl { .. }));
    }
}
