//! Configuration types for page-image captioning.
//!
//! All run behaviour is controlled through [`CaptionConfig`], built via its
//! [`CaptionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across runs, serialise them for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::WebcapError;
use serde::{Deserialize, Serialize};

/// Default source-attribute prefix identifying downloadable page images.
pub const DEFAULT_ASSET_HOST: &str = "//upload.wikimedia.org";

/// Default ordered candidate base URLs for metadata resolution.
pub const DEFAULT_METADATA_SOURCES: [&str; 2] = [
    "https://commons.wikimedia.org/wiki/File:",
    "https://en.wikipedia.org/wiki/File:",
];

/// Default keyword set marking a description as complex/technical content.
///
/// Matching is done against the lowercased description, so every entry here
/// must itself be lowercase or it can never fire.
pub const DEFAULT_COMPLEX_KEYWORDS: [&str; 8] = [
    "diagram",
    "chart",
    "scientific",
    "technical",
    "graph",
    "medical",
    "research",
    "delhi",
];

/// Configuration for a captioning run.
///
/// Built via [`CaptionConfig::builder()`] or using
/// [`CaptionConfig::default()`].
///
/// # Example
/// ```rust
/// use webcap::CaptionConfig;
///
/// let config = CaptionConfig::builder()
///     .model("llava")
///     .concurrency(4)
///     .min_description_len(80)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// Source-attribute prefix an `img` element must carry to be eligible
    /// for download. Default: [`DEFAULT_ASSET_HOST`].
    ///
    /// This is what keeps site chrome (logos, icons, tracking pixels) out of
    /// the pipeline: only images served from the recognised asset host are
    /// downloaded and captioned.
    pub asset_host: String,

    /// Ordered candidate base URLs for metadata resolution. Each is tried in
    /// turn with the image's base filename appended; the first that answers
    /// with a success status wins. Default: [`DEFAULT_METADATA_SOURCES`].
    pub metadata_sources: Vec<String>,

    /// Prompt template for both captioning strategies.
    ///
    /// Recognised placeholders: `{title}` and `{description}`. Unknown
    /// placeholders are left intact. Default:
    /// [`crate::prompts::DEFAULT_PROMPT_TEMPLATE`].
    pub prompt_template: String,

    /// Caption template for the template-backed (simple) strategy.
    ///
    /// Recognised placeholders: `{title}` and `{description}` (description
    /// truncated before substitution). Default:
    /// [`crate::prompts::DEFAULT_CAPTION_TEMPLATE`].
    pub caption_template: String,

    /// Model name sent to the vision endpoint. Default: "llava".
    pub model: String,

    /// Vision endpoint URL accepting an Ollama-style `/api/generate` POST.
    /// Default: "http://localhost:11434/api/generate".
    pub model_url: String,

    /// Description length (in characters) below which the model-backed
    /// captioner is chosen. Default: 100.
    ///
    /// The rule fires strictly below the threshold: a 100-character
    /// description does not trigger it, a 99-character one does.
    pub min_description_len: usize,

    /// Minimum width for an image to count as high-resolution. Default: 800.
    pub min_width: u32,

    /// Minimum height for an image to count as high-resolution. Default: 600.
    pub min_height: u32,

    /// Keywords marking a description as complex content (lowercase).
    /// Default: [`DEFAULT_COMPLEX_KEYWORDS`].
    pub complex_keywords: Vec<String>,

    /// Maximum concurrent image downloads. Default: 8.
    ///
    /// The downloads are network-bound, so fanning out cuts wall-clock time
    /// roughly linearly — but an image-heavy page could otherwise open
    /// hundreds of sockets at once. The cap bounds that fan-out; one slow or
    /// failing download never blocks its siblings either way.
    pub concurrency: usize,

    /// Per-request timeout for page, image, and metadata GETs, in seconds.
    /// Default: 30.
    pub download_timeout_secs: u64,

    /// Per-call timeout for the vision endpoint POST, in seconds.
    /// Default: 120. Vision models routinely take tens of seconds per image.
    pub api_timeout_secs: u64,

    /// Maximum retry attempts on a transport-level model-call failure.
    /// Default: 2.
    ///
    /// Only transport errors (connection refused, timeout) are retried.
    /// Non-success HTTP statuses are immediate, non-retried failures.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff).
    /// Default: 500. Doubles after each attempt: 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            asset_host: DEFAULT_ASSET_HOST.to_string(),
            metadata_sources: DEFAULT_METADATA_SOURCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            prompt_template: crate::prompts::DEFAULT_PROMPT_TEMPLATE.to_string(),
            caption_template: crate::prompts::DEFAULT_CAPTION_TEMPLATE.to_string(),
            model: "llava".to_string(),
            model_url: "http://localhost:11434/api/generate".to_string(),
            min_description_len: 100,
            min_width: 800,
            min_height: 600,
            complex_keywords: DEFAULT_COMPLEX_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            concurrency: 8,
            download_timeout_secs: 30,
            api_timeout_secs: 120,
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}

impl CaptionConfig {
    /// Create a new builder for `CaptionConfig`.
    pub fn builder() -> CaptionConfigBuilder {
        CaptionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`CaptionConfig`].
#[derive(Debug)]
pub struct CaptionConfigBuilder {
    config: CaptionConfig,
}

impl CaptionConfigBuilder {
    pub fn asset_host(mut self, prefix: impl Into<String>) -> Self {
        self.config.asset_host = prefix.into();
        self
    }

    pub fn metadata_sources(mut self, sources: Vec<String>) -> Self {
        self.config.metadata_sources = sources;
        self
    }

    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.config.prompt_template = template.into();
        self
    }

    pub fn caption_template(mut self, template: impl Into<String>) -> Self {
        self.config.caption_template = template.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn model_url(mut self, url: impl Into<String>) -> Self {
        self.config.model_url = url.into();
        self
    }

    pub fn min_description_len(mut self, len: usize) -> Self {
        self.config.min_description_len = len;
        self
    }

    pub fn min_resolution(mut self, width: u32, height: u32) -> Self {
        self.config.min_width = width;
        self.config.min_height = height;
        self
    }

    pub fn complex_keywords(mut self, keywords: Vec<String>) -> Self {
        // Matching is case-insensitive on the description side only.
        self.config.complex_keywords = keywords.into_iter().map(|k| k.to_lowercase()).collect();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CaptionConfig, WebcapError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(WebcapError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        if c.asset_host.is_empty() {
            return Err(WebcapError::InvalidConfig(
                "Asset-host prefix must not be empty".into(),
            ));
        }
        if c.model.is_empty() {
            return Err(WebcapError::InvalidConfig("Model name must not be empty".into()));
        }
        if c.model_url.is_empty() {
            return Err(WebcapError::InvalidConfig(
                "Model endpoint URL must not be empty".into(),
            ));
        }
        if c.metadata_sources.is_empty() {
            return Err(WebcapError::InvalidConfig(
                "At least one metadata source URL is required".into(),
            ));
        }
        Ok(self.config)
    }
}
