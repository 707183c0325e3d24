//! Top-level conversion entry points.
//!
//! One chapter is processed start-to-finish, fully sequentially: the raw
//! LaTeX stages run first (subfigure grouping, diagram rendering), then the
//! single blocking converter call, then the Markdown stages in their
//! documented order. Only the converter call is document-fatal — everything
//! else degrades locally.

use crate::chapter::ChapterContext;
use crate::config::ConversionConfig;
use crate::converter::{FormatConverter, PandocConverter};
use crate::error::ConvertError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::{diagrams, frontmatter, images, paths, postprocess, styles, subfigures};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert one LaTeX chapter file to MDX.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Returns `Err(ConvertError)` only for fatal errors: unreadable source or a
/// failed format-conversion call. Diagram failures and structural mismatches
/// degrade in place (check `output.stats`).
pub fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let total_start = Instant::now();
    let path = input.as_ref();
    info!("Starting conversion: {}", path.display());

    let raw = read_source(path)?;
    let ctx = ChapterContext::from_source(path, &raw);
    debug!("Chapter '{}' titled {:?}", ctx.slug, ctx.title);

    // ── Raw-source stages ────────────────────────────────────────────────
    let (text, subfigure_groups) = subfigures::group_subfigures(&raw);
    let (text, diagram_stats) = diagrams::render_diagrams(&text, &ctx, config);

    // ── Format conversion (fatal on failure) ─────────────────────────────
    let converter = resolve_converter(config);
    let markdown = converter.convert(&text, &config.source_format)?;
    debug!("Converter produced {} bytes of markdown", markdown.len());

    // ── Converted-text stages ────────────────────────────────────────────
    let text = postprocess::clean_markdown(&markdown);
    let (text, figures_resolved) = images::resolve_images(&text, &ctx);
    let text = paths::normalize_paths(&text, &ctx);
    let text = styles::strip_styles(&text);

    let mdx = if config.include_frontmatter {
        frontmatter::prepend_frontmatter(&text, &ctx.title)
    } else {
        text
    };

    let stats = ConversionStats {
        diagrams_rendered: diagram_stats.rendered,
        diagrams_failed: diagram_stats.failed,
        subfigure_groups,
        figures_resolved,
        duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Converted '{}': {} diagram(s) rendered, {} failed, {} subfigure group(s), {}ms",
        ctx.slug, stats.diagrams_rendered, stats.diagrams_failed, stats.subfigure_groups,
        stats.duration_ms
    );

    Ok(ConversionOutput {
        mdx,
        title: ctx.title,
        chapter: ctx.slug,
        stats,
    })
}

/// Convert a chapter and write `index.mdx` into `output_dir`.
///
/// The output directory is created if absent. Uses atomic write (temp file +
/// rename) to prevent partial files.
pub fn convert_to_file(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, ConvertError> {
    let output = convert(input, config)?;
    let dir = output_dir.as_ref();

    fs::create_dir_all(dir).map_err(|e| ConvertError::DirCreateFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let dest = dir.join("index.mdx");
    let tmp = dir.join("index.mdx.tmp");
    fs::write(&tmp, &output.mdx).map_err(|e| ConvertError::OutputWriteFailed {
        path: dest.clone(),
        source: e,
    })?;
    fs::rename(&tmp, &dest).map_err(|e| ConvertError::OutputWriteFailed {
        path: dest.clone(),
        source: e,
    })?;

    info!("Wrote {}", dest.display());
    Ok(output.stats)
}

fn read_source(path: &Path) -> Result<String, ConvertError> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ConvertError::SourceNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(ConvertError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(e) => Err(ConvertError::SourceRead {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn resolve_converter(config: &ConversionConfig) -> Arc<dyn FormatConverter> {
    match &config.converter {
        Some(converter) => Arc::clone(converter),
        None => Arc::new(PandocConverter::new(config.pandoc_command.as_str())),
    }
}
