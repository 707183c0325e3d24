//! Diagram rendering: compile TikZ blocks to PNG assets.
//!
//! ## Why render before the converter?
//!
//! The generic converter has no idea what a `tikzpicture` is; left in place
//! the diagram source would be mangled into unreadable text. Each block is
//! compiled as a standalone LaTeX document and rasterised to a PNG under the
//! public asset tree, then replaced in the source by an image tag pointing at
//! the published path.
//!
//! ## Failure policy
//!
//! Rendering needs a working `pdflatex` + rasteriser toolchain, either of
//! which may be absent or may choke on a given diagram. Any failure is logged
//! and the block degrades to a literal `verbatim` copy of its source, so the
//! chapter always stays renderable. Exactly one attempt per diagram; no
//! retries.
//!
//! Every render attempt gets its own [`TempDir`], torn down on success,
//! failure, and panic alike.

use crate::chapter::ChapterContext;
use crate::config::ConversionConfig;
use crate::error::DiagramError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, info, warn};
use uuid::Uuid;

static RE_TIKZ: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\begin\{tikzpicture\}.*?\\end\{tikzpicture\}").unwrap());

/// Package and TikZ-library declarations worth carrying into the standalone
/// document, so diagrams using custom macros still compile.
static RE_PREAMBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*\\(?:usepackage(?:\[[^\]]*\])?|usetikzlibrary)\{[^}]*\}").unwrap()
});

/// Counters for one chapter's diagram pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagramStats {
    pub rendered: usize,
    pub failed: usize,
}

/// Render every TikZ block in `text`, in source order.
///
/// Successful renders are replaced by an image tag referencing the public
/// asset path; failures are replaced by a `verbatim` block holding the
/// original diagram source.
pub fn render_diagrams(
    text: &str,
    ctx: &ChapterContext,
    config: &ConversionConfig,
) -> (String, DiagramStats) {
    let blocks: Vec<regex::Match<'_>> = RE_TIKZ.find_iter(text).collect();
    if blocks.is_empty() {
        return (text.to_string(), DiagramStats::default());
    }

    let preamble = harvest_preamble(text);
    let asset_dir = config.public_dir.join("figures").join(&ctx.slug);
    let mut stats = DiagramStats::default();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;

    for (index, block) in blocks.iter().enumerate() {
        out.push_str(&text[cursor..block.start()]);
        cursor = block.end();

        let file_name = format!("diagram_{}_{}.png", index, short_token());
        let dest = asset_dir.join(&file_name);
        match render_one(index, block.as_str(), &preamble, &dest, config) {
            Ok(()) => {
                stats.rendered += 1;
                let public = format!("{}/{}", ctx.figures_prefix(), file_name);
                info!("Rendered diagram {} -> {}", index, public);
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"Diagram {}\" />",
                    public,
                    index + 1
                ));
            }
            Err(e) => {
                stats.failed += 1;
                warn!("{e}; falling back to literal diagram source");
                out.push_str(&format!(
                    "\\begin{{verbatim}}\n{}\n\\end{{verbatim}}",
                    block.as_str()
                ));
            }
        }
    }
    out.push_str(&text[cursor..]);

    (out, stats)
}

/// Compile one diagram in a fresh scratch directory and rasterise the PDF to
/// `dest`. The scratch directory is removed when this function returns, on
/// every path.
fn render_one(
    index: usize,
    source: &str,
    preamble: &str,
    dest: &Path,
    config: &ConversionConfig,
) -> Result<(), DiagramError> {
    let scratch = TempDir::new().map_err(|e| DiagramError::CompileFailed {
        index,
        detail: format!("failed to create scratch dir: {e}"),
    })?;
    let tex_path = scratch.path().join("diagram.tex");
    fs::write(&tex_path, standalone_document(source, preamble)).map_err(|e| {
        DiagramError::CompileFailed {
            index,
            detail: format!("failed to write diagram.tex: {e}"),
        }
    })?;

    debug!("Compiling diagram {} in {}", index, scratch.path().display());
    let compile = Command::new(&config.latex_command)
        .arg("-interaction=nonstopmode")
        .arg("-halt-on-error")
        .arg("-output-directory")
        .arg(scratch.path())
        .arg(&tex_path)
        .current_dir(scratch.path())
        .output()
        .map_err(|e| DiagramError::CompileFailed {
            index,
            detail: format!("{}: {e}", config.latex_command),
        })?;
    if !compile.status.success() {
        return Err(DiagramError::CompileFailed {
            index,
            detail: format!(
                "{} exited with {}: {}",
                config.latex_command,
                compile.status,
                tail(&compile.stdout)
            ),
        });
    }

    let pdf = scratch.path().join("diagram.pdf");
    if !pdf.exists() {
        return Err(DiagramError::MissingArtifact { index, path: pdf });
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| DiagramError::AssetWriteFailed {
            index,
            detail: format!("create {}: {e}", parent.display()),
        })?;
    }

    let raster = Command::new(&config.raster_command)
        .arg("-density")
        .arg(config.density.to_string())
        .arg(&pdf)
        .arg("-quality")
        .arg(config.quality.to_string())
        .arg(dest)
        .output()
        .map_err(|e| DiagramError::RasteriseFailed {
            index,
            detail: format!("{}: {e}", config.raster_command),
        })?;
    if !raster.status.success() {
        return Err(DiagramError::RasteriseFailed {
            index,
            detail: format!(
                "{} exited with {}: {}",
                config.raster_command,
                raster.status,
                tail(&raster.stderr)
            ),
        });
    }
    if !dest.exists() {
        return Err(DiagramError::RasteriseFailed {
            index,
            detail: "rasteriser reported success but wrote no PNG".into(),
        });
    }

    Ok(())
}

/// Wrap a diagram in a minimal standalone document, inheriting the chapter's
/// package declarations.
fn standalone_document(source: &str, preamble: &str) -> String {
    let mut doc = String::from("\\documentclass[tikz,border=2pt]{standalone}\n");
    if !preamble.is_empty() {
        doc.push_str(preamble);
        doc.push('\n');
    }
    doc.push_str("\\begin{document}\n");
    doc.push_str(source);
    doc.push_str("\n\\end{document}\n");
    doc
}

/// Collect `\usepackage`/`\usetikzlibrary` lines from the full document,
/// deduplicated in source order.
fn harvest_preamble(text: &str) -> String {
    let mut seen = Vec::new();
    for m in RE_PREAMBLE.find_iter(text) {
        let line = m.as_str().trim();
        if !seen.iter().any(|s: &&str| *s == line) {
            seen.push(line);
        }
    }
    seen.join("\n")
}

/// Random 8-hex-char token keeping asset names collision-free within a
/// chapter even across repeated runs.
fn short_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(8);
    token
}

/// Last few hundred bytes of tool output, enough to show the actual error
/// without dumping a whole LaTeX log into the warning.
fn tail(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    match trimmed.char_indices().nth_back(300) {
        Some((i, _)) => format!("…{}", &trimmed[i..]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ChapterContext {
        ChapterContext {
            slug: "graphs".into(),
            title: "Graphs".into(),
        }
    }

    fn broken_toolchain_config(public_dir: &Path) -> ConversionConfig {
        ConversionConfig::builder()
            .public_dir(public_dir)
            .latex_command("tex2mdx-missing-latex")
            .build()
            .unwrap()
    }

    const TWO_DIAGRAMS: &str = r"\usetikzlibrary{arrows}
Before.
\begin{tikzpicture}
\node (a) {A};
\end{tikzpicture}
Between.
\begin{tikzpicture}
\node (b) {B};
\end{tikzpicture}
After.";

    #[test]
    fn unavailable_toolchain_degrades_every_block_to_verbatim() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = broken_toolchain_config(dir.path());
        let (out, stats) = render_diagrams(TWO_DIAGRAMS, &ctx(), &config);

        assert_eq!(stats.rendered, 0);
        assert_eq!(stats.failed, 2);
        assert_eq!(out.matches("\\begin{verbatim}").count(), 2);
        assert_eq!(out.matches("\\begin{tikzpicture}").count(), 2);
        assert!(!out.contains("<img"));
        // Surrounding prose is untouched.
        assert!(out.contains("Before.") && out.contains("Between.") && out.contains("After."));
    }

    #[cfg(unix)]
    #[test]
    fn compiler_without_output_is_missing_artifact() {
        // `true` exits 0 but writes nothing, exercising the missing-PDF path.
        let dir = tempfile::TempDir::new().unwrap();
        let config = ConversionConfig::builder()
            .public_dir(dir.path())
            .latex_command("true")
            .build()
            .unwrap();
        let input = "\\begin{tikzpicture}\\node {x};\\end{tikzpicture}";
        let (out, stats) = render_diagrams(input, &ctx(), &config);
        assert_eq!(stats.failed, 1);
        assert!(out.contains("\\begin{verbatim}"));
    }

    #[test]
    fn text_without_diagrams_is_untouched() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = broken_toolchain_config(dir.path());
        let input = "No diagrams here, just \\includegraphics{a.png}.";
        let (out, stats) = render_diagrams(input, &ctx(), &config);
        assert_eq!(out, input);
        assert_eq!(stats.rendered + stats.failed, 0);
    }

    #[test]
    fn preamble_harvest_keeps_order_and_dedupes() {
        let text = "\\usepackage{amsmath}\n\\usetikzlibrary{arrows}\n\\usepackage{amsmath}\n";
        let preamble = harvest_preamble(text);
        assert_eq!(preamble, "\\usepackage{amsmath}\n\\usetikzlibrary{arrows}");
    }

    #[test]
    fn standalone_document_shape() {
        let doc = standalone_document("\\begin{tikzpicture}\\end{tikzpicture}", "\\usepackage{x}");
        assert!(doc.starts_with("\\documentclass[tikz,border=2pt]{standalone}\n\\usepackage{x}\n"));
        assert!(doc.contains("\\begin{document}"));
        assert!(doc.trim_end().ends_with("\\end{document}"));
    }

    #[test]
    fn tokens_are_short_hex() {
        let token = short_token();
        assert_eq!(token.len(), 8);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, short_token());
    }
}
