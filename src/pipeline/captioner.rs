//! The two captioning strategies behind one capability trait.
//!
//! The selector decides *which* strategy runs; this module owns *how* each
//! one produces its caption. Putting both behind [`Captioner`] keeps the
//! orchestration loop single-sourced — there is exactly one per-image loop,
//! not one per strategy.
//!
//! * [`TemplateCaptioner`] — formats the resolved metadata through a
//!   configurable template. No network, no declared failure mode.
//! * [`ModelCaptioner`] — reads the staged image bytes, base64-encodes them,
//!   renders the prompt template, and POSTs an Ollama-style generate request
//!   to the vision endpoint.
//!
//! ## Retry Strategy (model path only)
//!
//! Transport errors (refused connection, timeout) are transient and worth a
//! bounded retry with exponential backoff: with 500 ms base and 2 retries the
//! wait sequence is 500 ms → 1 s. Non-success HTTP statuses are immediate,
//! non-retried failures — a 4xx/5xx with a body is diagnostic, not transient.

use crate::config::CaptionConfig;
use crate::error::ImageError;
use crate::output::ImageMetadata;
use crate::pipeline::download::DownloadedAsset;
use crate::prompts::render_prompt;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Characters of description kept by the template strategy before "...".
const SIMPLE_DESCRIPTION_LIMIT: usize = 50;

/// A captioning strategy: staged image + metadata in, caption out.
#[async_trait]
pub trait Captioner: Send + Sync {
    async fn caption(
        &self,
        asset: &DownloadedAsset,
        metadata: &ImageMetadata,
    ) -> Result<String, ImageError>;
}

// ── Simple strategy ──────────────────────────────────────────────────────

/// Template-backed captioner: cheap, local, always succeeds.
pub struct TemplateCaptioner {
    template: String,
}

impl TemplateCaptioner {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

#[async_trait]
impl Captioner for TemplateCaptioner {
    async fn caption(
        &self,
        _asset: &DownloadedAsset,
        metadata: &ImageMetadata,
    ) -> Result<String, ImageError> {
        let description = truncate_chars(&metadata.description, SIMPLE_DESCRIPTION_LIMIT);
        Ok(render_prompt(&self.template, &metadata.title, &description))
    }
}

/// First `limit` characters of the description, with an unconditional
/// "..." suffix — the suffix marks "this is an excerpt", not "this was cut".
fn truncate_chars(s: &str, limit: usize) -> String {
    let mut out: String = s.chars().take(limit).collect();
    out.push_str("...");
    out
}

// ── Rich strategy ────────────────────────────────────────────────────────

/// Wire format of the vision-endpoint request.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<String>,
    stream: bool,
}

/// The only field we need from the endpoint's reply.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Vision-model-backed captioner.
///
/// Reuses the already-staged image file rather than re-fetching the URL —
/// the bytes on disk are the same bytes the model needs to see.
pub struct ModelCaptioner {
    client: reqwest::Client,
    model: String,
    model_url: String,
    prompt_template: String,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl ModelCaptioner {
    pub fn new(client: reqwest::Client, config: &CaptionConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            model_url: config.model_url.clone(),
            prompt_template: config.prompt_template.clone(),
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }
}

#[async_trait]
impl Captioner for ModelCaptioner {
    async fn caption(
        &self,
        asset: &DownloadedAsset,
        metadata: &ImageMetadata,
    ) -> Result<String, ImageError> {
        let url = asset.image.url.clone();
        let Some(path) = asset.local_path.as_deref() else {
            return Err(ImageError::Encode {
                url,
                detail: "no staged file for this image".to_string(),
            });
        };

        let bytes = tokio::fs::read(path).await.map_err(|e| ImageError::Encode {
            url: url.clone(),
            detail: e.to_string(),
        })?;
        let encoded = STANDARD.encode(&bytes);
        debug!("Encoded {} → {} bytes base64", url, encoded.len());

        let prompt = render_prompt(&self.prompt_template, &metadata.title, &metadata.description);
        let request = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            images: vec![encoded],
            stream: false,
        };

        let mut last_err = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "Model call for {}: retry {}/{} after {}ms",
                    url, attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            let response = match self
                .client
                .post(&self.model_url)
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    // Transport-level failure: worth another attempt.
                    last_err = e.to_string();
                    warn!("Model call for {}: attempt {} failed — {}", url, attempt + 1, last_err);
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!("Model endpoint returned HTTP {} for {}: {}", status, url, body);
                return Err(ImageError::Model {
                    url,
                    status: status.as_u16(),
                    body,
                });
            }

            return match response.json::<GenerateResponse>().await {
                Ok(reply) => Ok(reply.response),
                Err(e) => Err(ImageError::Model {
                    url,
                    status: status.as_u16(),
                    body: format!("malformed reply: {e}"),
                }),
            };
        }

        Err(ImageError::ModelTransport {
            url,
            retries: self.max_retries,
            detail: last_err,
        })
    }
}
