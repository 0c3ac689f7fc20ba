//! Pipeline stages for page-image captioning.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the HTML parser) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ extract ──▶ download ──▶ metadata ──▶ select ──▶ captioner
//! (page)    (scraper)   (fan-out)    (per-image)  (heuristic) (rich/simple)
//! ```
//!
//! 1. [`fetch`]     — GET the page HTML; failure degrades to "no images"
//! 2. [`extract`]   — scan `img` elements, keep asset-host matches
//! 3. [`download`]  — bounded concurrent fan-out into the staging dir; the
//!    only stage with parallelism
//! 4. [`metadata`]  — ordered-source lookup of title/description per image
//! 5. [`select`]    — pure decision tree picking Rich vs Simple
//! 6. [`captioner`] — the two strategies behind one trait; the model-backed
//!    path is the only stage that POSTs

pub mod captioner;
pub mod download;
pub mod extract;
pub mod fetch;
pub mod metadata;
pub mod select;
