//! Chapter identity: the namespace key for every generated asset.
//!
//! A chapter is one LaTeX source file. Its file stem becomes the *slug* under
//! which all rasterised figures are published (`/figures/<slug>/…`), and its
//! `\chapter{…}` (or `\title{…}`) declaration becomes the display title.
//!
//! The context is threaded explicitly through every stage that needs the
//! namespace — there is no process-wide "current chapter" variable, so two
//! conversions can never observe each other's state.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Title used when the source declares neither `\chapter` nor `\title`.
pub const UNTITLED: &str = "Untitled";

/// Per-conversion chapter identity, immutable for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterContext {
    /// Asset namespace key, derived from the source file stem.
    pub slug: String,
    /// Display title extracted from the source, or [`UNTITLED`].
    pub title: String,
}

impl ChapterContext {
    /// Build the context from a source path and its raw content.
    pub fn from_source(path: &Path, raw: &str) -> Self {
        let slug = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chapter".to_string());
        Self {
            slug,
            title: extract_title(raw),
        }
    }

    /// Public URL prefix for this chapter's figure assets (no trailing slash).
    pub fn figures_prefix(&self) -> String {
        format!("/figures/{}", self.slug)
    }
}

static RE_CHAPTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\chapter\{([^}]*)\}").unwrap());
static RE_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\title\{([^}]*)\}").unwrap());

/// Extract the chapter title from raw LaTeX.
///
/// `\chapter{…}` wins over `\title{…}`; with neither present the sentinel
/// [`UNTITLED`] is returned. Pure function, no failure mode.
pub fn extract_title(raw: &str) -> String {
    RE_CHAPTER
        .captures(raw)
        .or_else(|| RE_TITLE.captures(raw))
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| UNTITLED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn chapter_declaration_wins() {
        let raw = "\\title{The Title}\n\\chapter{Graph Theory}\nbody";
        assert_eq!(extract_title(raw), "Graph Theory");
    }

    #[test]
    fn falls_back_to_title() {
        assert_eq!(extract_title("\\title{Standalone Notes}"), "Standalone Notes");
    }

    #[test]
    fn untitled_when_no_declaration() {
        assert_eq!(extract_title("just some text"), UNTITLED);
    }

    #[test]
    fn slug_from_file_stem() {
        let ctx = ChapterContext::from_source(
            &PathBuf::from("chapters/graph_theory.tex"),
            "\\chapter{Graph Theory}",
        );
        assert_eq!(ctx.slug, "graph_theory");
        assert_eq!(ctx.figures_prefix(), "/figures/graph_theory");
    }
}
