//! CLI binary for webcap.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `CaptionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use webcap::{caption_image, caption_page, CaptionConfig, CaptionOutput};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Caption every Wikimedia image on a page (stdout)
  webcap https://en.wikipedia.org/wiki/James_Bond

  # Caption one specific image
  webcap --image https://upload.wikimedia.org/wikipedia/commons/c/c3/Hoagy_Carmichael_-_1947.jpg

  # Use a remote Ollama endpoint
  webcap --model llava --model-url http://gpu-box:11434/api/generate https://en.wikipedia.org/wiki/Steam_engine

  # Structured JSON output (captions + per-image outcomes + stats)
  webcap --json https://en.wikipedia.org/wiki/James_Bond > captions.json

  # Tighter routing: send anything under 150 chars of description to the model
  webcap --min-length 150 https://en.wikipedia.org/wiki/Turbine

SELECTION HEURISTIC (first matching rule wins):
  1. description empty or whitespace        → model caption
  2. description shorter than --min-length  → model caption
  3. image at least --min-width×--min-height→ model caption
  4. description contains a keyword         → model caption
  5. otherwise                              → metadata template

ENVIRONMENT VARIABLES:
  WEBCAP_MODEL       Vision model name (default: llava)
  WEBCAP_MODEL_URL   Vision endpoint URL (default: http://localhost:11434/api/generate)

SETUP:
  1. Start an Ollama-compatible endpoint:  ollama serve && ollama pull llava
  2. Caption a page:                       webcap https://en.wikipedia.org/wiki/James_Bond
"#;

/// Caption the images on a web page using Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "webcap",
    version,
    about = "Caption the images on a web page using Vision LLMs",
    long_about = "Scan a web page for images served from a recognised asset host, download them \
concurrently, resolve per-image metadata from their file pages, and caption each one — either \
from its metadata or through a vision model, chosen per image by a content heuristic.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Page URL to scan for images (ignored when --image is given).
    input: Option<String>,

    /// Caption this single image URL instead of scanning a page.
    #[arg(long, env = "WEBCAP_IMAGE")]
    image: Option<String>,

    /// Vision model name sent to the endpoint.
    #[arg(long, env = "WEBCAP_MODEL", default_value = "llava")]
    model: String,

    /// Vision endpoint URL (Ollama-style /api/generate).
    #[arg(
        long,
        env = "WEBCAP_MODEL_URL",
        default_value = "http://localhost:11434/api/generate"
    )]
    model_url: String,

    /// Source-attribute prefix an image must carry to be downloaded.
    #[arg(long, env = "WEBCAP_ASSET_HOST", default_value = "//upload.wikimedia.org")]
    asset_host: String,

    /// Path to a text file containing a custom prompt template
    /// ({title} and {description} placeholders).
    #[arg(long, env = "WEBCAP_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Maximum concurrent image downloads.
    #[arg(short, long, env = "WEBCAP_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// Description length (chars) below which the model path is chosen.
    #[arg(long, env = "WEBCAP_MIN_LENGTH", default_value_t = 100)]
    min_length: usize,

    /// Minimum width for the high-resolution rule.
    #[arg(long, env = "WEBCAP_MIN_WIDTH", default_value_t = 800)]
    min_width: u32,

    /// Minimum height for the high-resolution rule.
    #[arg(long, env = "WEBCAP_MIN_HEIGHT", default_value_t = 600)]
    min_height: u32,

    /// Comma-separated keywords marking complex content (replaces defaults).
    #[arg(long, env = "WEBCAP_KEYWORDS", value_delimiter = ',')]
    keywords: Option<Vec<String>>,

    /// HTTP timeout for page/image/metadata GETs, in seconds.
    #[arg(long, env = "WEBCAP_DOWNLOAD_TIMEOUT", default_value_t = 30)]
    download_timeout: u64,

    /// Per-call timeout for the vision endpoint, in seconds.
    #[arg(long, env = "WEBCAP_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Retries on a transport-level model-call failure.
    #[arg(long, env = "WEBCAP_MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    /// Output structured JSON (CaptionOutput) instead of plain captions.
    #[arg(long, env = "WEBCAP_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "WEBCAP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WEBCAP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and captions.
    #[arg(short, long, env = "WEBCAP_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // summary at the end carries everything the user needs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;

    let spinner = if show_progress {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Captioning");
        bar.set_message("fetching page…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    // ── Run ──────────────────────────────────────────────────────────────
    let output = match (&cli.image, &cli.input) {
        (Some(image_url), _) => caption_image(image_url, &config)
            .await
            .context("Captioning failed")?,
        (None, Some(page_url)) => caption_page(page_url, &config)
            .await
            .context("Captioning failed")?,
        (None, None) => anyhow::bail!("Provide a page URL or --image <URL>"),
    };

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    // ── Print results ────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    print_captions(&output)?;
    if !cli.quiet {
        print_summary(&output);
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<CaptionConfig> {
    let mut builder = CaptionConfig::builder()
        .model(cli.model.as_str())
        .model_url(cli.model_url.as_str())
        .asset_host(cli.asset_host.as_str())
        .concurrency(cli.concurrency)
        .min_description_len(cli.min_length)
        .min_resolution(cli.min_width, cli.min_height)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout)
        .max_retries(cli.max_retries);

    if let Some(ref path) = cli.prompt_file {
        let template = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file '{}'", path.display()))?;
        builder = builder.prompt_template(template.trim().to_string());
    }

    if let Some(ref keywords) = cli.keywords {
        builder = builder.complex_keywords(keywords.clone());
    }

    builder.build().context("Invalid configuration")
}

fn print_captions(output: &CaptionOutput) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for outcome in &output.images {
        if let Some(ref caption) = outcome.caption {
            writeln!(handle, "{}\n  {}\n", outcome.url, caption)
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn print_summary(output: &CaptionOutput) {
    let stats = &output.stats;
    let mark = if stats.captioned == stats.discovered && stats.discovered > 0 {
        green("✔")
    } else if stats.captioned == 0 {
        red("✘")
    } else {
        cyan("⚠")
    };
    eprintln!(
        "{mark}  {}/{} images captioned  {}",
        bold(&stats.captioned.to_string()),
        stats.discovered,
        dim(&format!(
            "({} rich, {} simple, {} download failures, {} dropped, {}ms)",
            stats.rich, stats.simple, stats.failed_downloads, stats.dropped, stats.total_ms
        )),
    );
    for outcome in &output.images {
        if let Some(ref error) = outcome.error {
            eprintln!("  {} {}", red("✗"), dim(&error.to_string()));
        }
    }
}
