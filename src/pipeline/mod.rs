//! Pipeline stages for LaTeX-to-MDX conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! harden one extraction heuristic without touching the rewrites around it.
//!
//! ## Data Flow
//!
//! ```text
//! raw LaTeX ──▶ subfigures ──▶ diagrams ──▶ [converter] ──▶ postprocess
//!               (grids)        (TikZ→PNG)    (pandoc)       (cleanup)
//!                    ──▶ images ──▶ paths ──▶ styles ──▶ frontmatter?
//!                       (figures)  (canonical) (strip)   (opt-in)
//! ```
//!
//! 1. [`subfigures`]  — restructure multi-image figure blocks *before* the
//!    generic converter flattens them beyond recovery
//! 2. [`diagrams`]    — compile TikZ blocks to PNG assets; the only stage
//!    with process/filesystem side effects
//! 3. [`postprocess`] — deterministic rewrites of the converted Markdown
//!    (brace escaping, code fences, math delimiters, tables, labels)
//! 4. [`images`]      — resolve residual single-image figures to image tags
//! 5. [`paths`]       — canonicalise every asset reference to
//!    `/figures/<chapter>/<file>`
//! 6. [`styles`]      — strip inline presentational attributes
//! 7. [`frontmatter`] — optional YAML `title`/`description` block
//!
//! All matching is heuristic pattern search, not a parser: a block that does
//! not match the expected shape passes through unchanged rather than failing
//! the chapter.

pub mod diagrams;
pub mod frontmatter;
pub mod images;
pub mod paths;
pub mod postprocess;
pub mod styles;
pub mod subfigures;

/// One image extracted from a figure or subfigure block.
///
/// The width hint is parsed so the extraction is lossless, but it is never
/// emitted: presentation belongs to the target renderer, not the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Path as written in the source, possibly extension-less.
    pub path: String,
    /// Caption attached to this image, if any.
    pub caption: Option<String>,
    /// Raw option string from `\includegraphics[…]`, if any.
    pub width_hint: Option<String>,
}
