//! CLI binary for tex2mdx.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints results. Two modes:
//!
//! * single chapter:  `tex2mdx chapters/graph_theory.tex out/graph_theory`
//! * batch:           `tex2mdx chapters/ out/` (every `*.tex`, one output
//!   directory per chapter; a failed chapter is reported and the batch
//!   continues)

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tex2mdx::{convert_to_file, ConversionConfig, ConversionStats};
use tracing_subscriber::EnvFilter;

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

// ── CLI definition ───────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "tex2mdx",
    version,
    about = "Convert LaTeX chapters to MDX for a component-based publishing pipeline"
)]
struct Args {
    /// LaTeX source file, or a directory of chapters (batch mode).
    input: PathBuf,

    /// Output directory (single mode) or output root (batch mode:
    /// one `<root>/<chapter>/index.mdx` per source file).
    output: PathBuf,

    /// Prepend a YAML frontmatter block with title/description.
    #[arg(long)]
    frontmatter: bool,

    /// Root of the public asset tree for rendered diagrams.
    #[arg(long, default_value = "public")]
    public_dir: PathBuf,

    /// Rasterisation density in DPI (72–600).
    #[arg(long, default_value_t = 300)]
    density: u32,

    /// PNG quality (1–100).
    #[arg(long, default_value_t = 90)]
    quality: u32,

    /// LaTeX compiler for standalone diagram documents.
    #[arg(long, default_value = "pdflatex", env = "TEX2MDX_LATEX")]
    latex_cmd: String,

    /// Rasteriser turning compiled PDFs into PNGs.
    #[arg(long, default_value = "magick", env = "TEX2MDX_RASTER")]
    raster_cmd: String,

    /// Format-converter binary.
    #[arg(long, default_value = "pandoc", env = "TEX2MDX_PANDOC")]
    pandoc_cmd: String,

    /// Print a machine-readable JSON summary to stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tex2mdx=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ConversionConfig::builder()
        .public_dir(&args.public_dir)
        .density(args.density)
        .quality(args.quality)
        .latex_command(&args.latex_cmd)
        .raster_command(&args.raster_cmd)
        .pandoc_command(&args.pandoc_cmd)
        .include_frontmatter(args.frontmatter)
        .build()
        .context("invalid configuration")?;

    if args.input.is_dir() {
        run_batch(&args, &config)
    } else {
        run_single(&args, &config)
    }
}

// ── Single-chapter mode ──────────────────────────────────────────────────────

fn run_single(args: &Args, config: &ConversionConfig) -> Result<()> {
    let stats = convert_to_file(&args.input, &args.output, config)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        eprintln!(
            "{} {} {}",
            green("✓"),
            bold(&args.input.display().to_string()),
            dim(&summary_line(&stats))
        );
        eprintln!("  → {}", args.output.join("index.mdx").display());
    }
    Ok(())
}

// ── Batch mode ───────────────────────────────────────────────────────────────

fn run_batch(args: &Args, config: &ConversionConfig) -> Result<()> {
    let chapters = collect_chapters(&args.input)?;
    anyhow::ensure!(
        !chapters.is_empty(),
        "no .tex files found in {}",
        args.input.display()
    );

    let bar = ProgressBar::new(chapters.len() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:42.green/238}] {pos:>3}/{len} chapters  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    bar.enable_steady_tick(Duration::from_millis(80));

    let mut results: Vec<ChapterResult> = Vec::with_capacity(chapters.len());
    for chapter in &chapters {
        let stem = chapter
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chapter".to_string());
        let out_dir = args.output.join(&stem);

        // A failed chapter never aborts the batch; log and move on.
        match convert_to_file(chapter, &out_dir, config) {
            Ok(stats) => {
                bar.println(format!(
                    "  {} {:<30} {}",
                    green("✓"),
                    stem,
                    dim(&summary_line(&stats))
                ));
                results.push(ChapterResult {
                    chapter: stem,
                    ok: true,
                    error: None,
                    stats: Some(stats),
                });
            }
            Err(e) => {
                bar.println(format!("  {} {:<30} {}", red("✗"), stem, red(&e.to_string())));
                results.push(ChapterResult {
                    chapter: stem,
                    ok: false,
                    error: Some(e.to_string()),
                    stats: None,
                });
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    let succeeded = results.iter().filter(|r| r.ok).count();
    let failed = results.len() - succeeded;
    eprintln!(
        "\n{} {} converted, {} failed",
        bold("Done:"),
        green(&succeeded.to_string()),
        if failed > 0 {
            red(&failed.to_string())
        } else {
            failed.to_string()
        }
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    anyhow::ensure!(failed == 0, "{failed} chapter(s) failed");
    Ok(())
}

#[derive(serde::Serialize)]
struct ChapterResult {
    chapter: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<ConversionStats>,
}

fn collect_chapters(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut chapters: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("tex"))
                .unwrap_or(false)
        })
        .collect();
    chapters.sort();
    Ok(chapters)
}

fn summary_line(stats: &ConversionStats) -> String {
    format!(
        "{} diagram(s), {} fallback(s), {} group(s), {} figure(s), {}ms",
        stats.diagrams_rendered,
        stats.diagrams_failed,
        stats.subfigure_groups,
        stats.figures_resolved,
        stats.duration_ms
    )
}
