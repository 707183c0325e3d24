//! # tex2mdx
//!
//! Convert LaTeX chapters to MDX for a component-based publishing pipeline.
//!
//! ## Why this crate?
//!
//! A generic LaTeX→Markdown converter (pandoc) flattens exactly the structure
//! an MDX site needs: subfigure groupings lose their captions, TikZ diagrams
//! turn into noise, image paths stop matching the asset-serving convention,
//! and converter-specific attribute remnants collide with MDX's templating
//! syntax. This crate wraps the converter in a multi-stage repair pipeline
//! that recovers that structure and produces byte-stable, chapter-namespaced
//! output.
//!
//! ## Pipeline Overview
//!
//! ```text
//! chapter.tex
//!  │
//!  ├─ 1. Title       \chapter{…} / \title{…} → display title
//!  ├─ 2. Subfigures  multi-image figures → grid markup (pre-conversion)
//!  ├─ 3. Diagrams    TikZ → PNG via pdflatex + rasteriser, with fallback
//!  ├─ 4. Convert     pandoc latex → markdown (black box, fatal on error)
//!  ├─ 5. Polish      braces, code fences, math, set notation, tables, labels
//!  ├─ 6. Images      residual figures → <img> / <figure> tags
//!  ├─ 7. Paths       everything onto /figures/<chapter>/<file>
//!  ├─ 8. Styles      inline presentational attributes stripped
//!  └─ 9. Output      index.mdx (+ optional frontmatter)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tex2mdx::{convert_to_file, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let stats = convert_to_file("chapters/graph_theory.tex", "out/graph_theory", &config)?;
//!     eprintln!("diagrams: {} rendered / {} failed",
//!         stats.diagrams_rendered, stats.diagrams_failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `tex2mdx` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! tex2mdx = { version = "0.1", default-features = false }
//! ```
//!
//! ## Failure model
//!
//! Only an unreadable source or a failed converter call aborts a chapter.
//! A diagram whose toolchain is missing degrades to a literal source block;
//! a figure that does not match the expected shape passes through unchanged.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod chapter;
pub mod config;
pub mod convert;
pub mod converter;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use chapter::{extract_title, ChapterContext, UNTITLED};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_to_file};
pub use converter::{FormatConverter, PandocConverter};
pub use error::{ConvertError, DiagramError};
pub use output::{ConversionOutput, ConversionStats};
