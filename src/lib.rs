//! # webcap
//!
//! Caption the images on a web page using Vision Language Models (VLMs).
//!
//! ## Why this crate?
//!
//! Page images rarely come with useful descriptions — alt-text is missing or
//! perfunctory, and file pages bury the good prose. This crate scans a page
//! for images served from a recognised asset host, downloads them
//! concurrently into an ephemeral staging area, pulls richer metadata from
//! the image's own file page, and then routes each image to the cheapest
//! captioning strategy that can do it justice: a local metadata template, or
//! a vision model that actually looks at the pixels.
//!
//! ## Pipeline Overview
//!
//! ```text
//! page URL
//!  │
//!  ├─ 1. Fetch     GET the page HTML
//!  ├─ 2. Extract   scan img elements, keep asset-host matches
//!  ├─ 3. Download  bounded concurrent fan-out into a staging TempDir
//!  ├─ 4. Metadata  per-image title/description from ordered file pages
//!  ├─ 5. Select    deterministic Rich-vs-Simple decision tree
//!  ├─ 6. Caption   template render, or base64 + POST to the VLM endpoint
//!  └─ 7. Cleanup   staging removed unconditionally; URL→caption map out
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use webcap::{caption_page, CaptionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CaptionConfig::builder()
//!         .model("llava")
//!         .model_url("http://localhost:11434/api/generate")
//!         .build()?;
//!     let output = caption_page("https://en.wikipedia.org/wiki/James_Bond", &config).await?;
//!     for (url, caption) in &output.captions {
//!         println!("{url}: {caption}");
//!     }
//!     eprintln!(
//!         "captioned {}/{} images ({} rich, {} simple)",
//!         output.stats.captioned, output.stats.discovered,
//!         output.stats.rich, output.stats.simple,
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `webcap` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! webcap = { version = "0.1", default-features = false }
//! ```
//!
//! ## Failure model
//!
//! Nothing after setup is fatal: an unreachable page, a failed download, a
//! missing metadata page, or a rejecting model endpoint each degrade to a
//! logged, per-image drop, and the run always returns a (possibly empty)
//! mapping. See [`error`] for the taxonomy.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CaptionConfig, CaptionConfigBuilder};
pub use error::{ImageError, WebcapError};
pub use output::{CaptionOutput, CaptionerChoice, ImageMetadata, ImageOutcome, ImageRef, RunStats};
pub use run::{caption_image, caption_page, caption_page_sync};
