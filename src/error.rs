//! Error types for the tex2mdx library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — **Fatal**: the chapter cannot be converted at all
//!   (source unreadable, pandoc failed, output not writable). Returned as
//!   `Err(ConvertError)` from the top-level `convert*` functions.
//!
//! * [`DiagramError`] — **Non-fatal**: a single TikZ diagram failed to render
//!   (compiler exited non-zero, PDF never appeared, rasteriser failed). The
//!   diagram degrades to a literal source block and the rest of the chapter
//!   converts normally.
//!
//! The separation lets callers decide their own tolerance: a batch driver can
//! log a fatal error and continue with the next chapter, while a diagram
//! failure never costs more than one figure.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the tex2mdx library.
///
/// Diagram-level failures use [`DiagramError`] and are absorbed inside the
/// rendering stage rather than propagated here.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source file was not found at the given path.
    #[error("LaTeX source not found: '{path}'\nCheck the path exists and is readable.")]
    SourceNotFound { path: PathBuf },

    /// Process does not have read permission on the source file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The source file exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The external format converter (pandoc) could not be spawned.
    #[error("Failed to run converter '{command}': {detail}\nIs pandoc installed and on PATH?")]
    ConverterUnavailable { command: String, detail: String },

    /// The external format converter ran but reported failure.
    #[error("Format conversion failed: {detail}")]
    ConversionFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output or asset directory.
    #[error("Failed to create directory '{path}': {source}")]
    DirCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the final `index.mdx`.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error for a single diagram render attempt.
///
/// Logged by the rendering stage; the diagram falls back to a literal
/// `verbatim` block so the chapter stays renderable even with no TikZ
/// toolchain installed. Each diagram is attempted exactly once.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DiagramError {
    /// The LaTeX compiler could not be spawned or exited non-zero.
    #[error("Diagram {index}: compile failed: {detail}")]
    CompileFailed { index: usize, detail: String },

    /// The compiler reported success but produced no PDF.
    #[error("Diagram {index}: compiler produced no output at '{path}'")]
    MissingArtifact { index: usize, path: PathBuf },

    /// The rasteriser could not be spawned, exited non-zero, or wrote no PNG.
    #[error("Diagram {index}: rasterisation failed: {detail}")]
    RasteriseFailed { index: usize, detail: String },

    /// The rendered PNG could not be placed in the public asset directory.
    #[error("Diagram {index}: failed to write asset: {detail}")]
    AssetWriteFailed { index: usize, detail: String },
}
