//! End-to-end pipeline tests.
//!
//! The format converter is a black box to the pipeline, so these tests inject
//! an identity converter and drive every repair stage against real chapter
//! text without requiring pandoc. The diagram toolchain is exercised both
//! ways: stubbed out with tiny shell scripts (success path) and pointed at a
//! nonexistent binary (fallback path).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tex2mdx::{
    convert, convert_to_file, ConversionConfig, ConvertError, FormatConverter,
};

// ── Test doubles ─────────────────────────────────────────────────────────────

/// Identity converter: hands the "converted" text straight back, so the
/// post-conversion stages see exactly what the raw-source stages produced.
struct IdentityConverter;

impl FormatConverter for IdentityConverter {
    fn convert(&self, input: &str, _from_format: &str) -> Result<String, ConvertError> {
        Ok(input.to_string())
    }
}

/// Converter that always fails, for the fatal-error contract.
struct FailingConverter;

impl FormatConverter for FailingConverter {
    fn convert(&self, _input: &str, _from_format: &str) -> Result<String, ConvertError> {
        Err(ConvertError::ConversionFailed {
            detail: "simulated converter crash".into(),
        })
    }
}

fn write_chapter(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn base_config(public_dir: &Path) -> ConversionConfig {
    ConversionConfig::builder()
        .public_dir(public_dir)
        .latex_command("tex2mdx-missing-latex")
        .converter(Arc::new(IdentityConverter))
        .build()
        .unwrap()
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

// ── Full chapter ─────────────────────────────────────────────────────────────

const CHAPTER: &str = r"\chapter{Graph Theory}
\usepackage{amsmath}
\label{ch:graphs}

Let \(G = (V, E)\) be a graph.

\begin{figure}
\centering
\includegraphics[width=0.5\textwidth]{img/foo.png}
\caption{Example}
\end{figure}

\begin{figure}
\begin{subfigure}[t]{0.45\textwidth}
\includegraphics{a.png}
\caption{A}
\end{subfigure}
\begin{subfigure}[t]{0.45\textwidth}
\includegraphics{b.png}
\caption{B}
\end{subfigure}
\caption{Two graphs}
\end{figure}

\begin{tikzpicture}
\node (v) {v};
\end{tikzpicture}

::: center
Degree $=$ number of incident edges
Order $=$ number of vertices
:::
";

#[test]
fn full_chapter_through_identity_converter() {
    let workspace = TempDir::new().unwrap();
    let config = base_config(&workspace.path().join("public"));
    let source = write_chapter(workspace.path(), "graph_theory.tex", CHAPTER);

    let output = convert(&source, &config).unwrap();

    assert_eq!(output.title, "Graph Theory");
    assert_eq!(output.chapter, "graph_theory");

    // Single-image figure resolved with caption, chapter-namespaced path.
    assert!(output
        .mdx
        .contains("<img src=\"/figures/graph_theory/foo.png\" alt=\"Example\" />"));
    assert!(output.mdx.contains("<figcaption>Example</figcaption>"));

    // Subfigure group: grid with both entries in source order plus outer caption.
    assert_eq!(output.stats.subfigure_groups, 1);
    assert!(output.mdx.contains("<div className=\"subfigure-grid\">"));
    let a = output.mdx.find("/figures/graph_theory/a.png").unwrap();
    let b = output.mdx.find("/figures/graph_theory/b.png").unwrap();
    assert!(a < b);
    assert!(output.mdx.contains("<figcaption>Two graphs</figcaption>"));

    // Broken toolchain: diagram degrades to a literal source block.
    assert_eq!(output.stats.diagrams_failed, 1);
    assert!(output.mdx.contains("\\begin{tikzpicture}"));
    assert!(!output.mdx.contains("src=\"/figures/graph_theory/diagram_"));

    // Math delimiters converted; label stripped.
    assert!(output.mdx.contains("$G = (V, E)$"));
    assert!(!output.mdx.contains("\\label"));

    // Definition table reformatted.
    assert!(output.mdx.contains("| Property | Definition |"));
    assert!(output.mdx.contains("| Degree | $=$ number of incident edges |"));
    assert!(output.mdx.contains("| Order | $=$ number of vertices |"));

    // No excessive blank lines anywhere.
    assert!(!output.mdx.contains("\n\n\n"));
}

#[test]
fn converter_failure_is_fatal_and_nothing_is_written() {
    let workspace = TempDir::new().unwrap();
    let config = ConversionConfig::builder()
        .public_dir(workspace.path().join("public"))
        .latex_command("tex2mdx-missing-latex")
        .converter(Arc::new(FailingConverter))
        .build()
        .unwrap();
    let source = write_chapter(workspace.path(), "bad.tex", "\\chapter{Bad}");
    let out_dir = workspace.path().join("out");

    let err = convert_to_file(&source, &out_dir, &config).unwrap_err();
    assert!(matches!(err, ConvertError::ConversionFailed { .. }));
    assert!(!out_dir.join("index.mdx").exists());
}

#[test]
fn writes_index_mdx_with_no_temp_leftovers() {
    let workspace = TempDir::new().unwrap();
    let config = base_config(&workspace.path().join("public"));
    let source = write_chapter(workspace.path(), "sets.tex", "\\chapter{Sets}\nBody text.\n");
    let out_dir = workspace.path().join("out/sets");

    let stats = convert_to_file(&source, &out_dir, &config).unwrap();
    assert_eq!(stats.diagrams_rendered + stats.diagrams_failed, 0);

    let mdx = fs::read_to_string(out_dir.join("index.mdx")).unwrap();
    assert!(mdx.contains("Body text."));
    assert!(!out_dir.join("index.mdx.tmp").exists());
}

#[test]
fn frontmatter_is_opt_in() {
    let workspace = TempDir::new().unwrap();
    let source = write_chapter(workspace.path(), "intro.tex", "\\chapter{Introduction}\nHi.\n");

    let plain = convert(&source, &base_config(&workspace.path().join("public"))).unwrap();
    assert!(!plain.mdx.starts_with("---"));

    let config = ConversionConfig::builder()
        .public_dir(workspace.path().join("public"))
        .latex_command("tex2mdx-missing-latex")
        .converter(Arc::new(IdentityConverter))
        .include_frontmatter(true)
        .build()
        .unwrap();
    let with = convert(&source, &config).unwrap();
    assert!(with.mdx.starts_with("---\ntitle: \"Introduction\"\n"));
    assert!(with.mdx.contains("description: \"Introduction\""));
}

#[test]
fn untitled_chapter_gets_sentinel_title() {
    let workspace = TempDir::new().unwrap();
    let source = write_chapter(workspace.path(), "anon.tex", "no declarations here\n");
    let output = convert(&source, &base_config(&workspace.path().join("public"))).unwrap();
    assert_eq!(output.title, "Untitled");
}

// ── Diagram toolchain (stubbed) ──────────────────────────────────────────────

/// With a working toolchain, N diagram blocks become N image tags under the
/// chapter namespace and zero literal source blocks.
#[cfg(unix)]
#[test]
fn working_toolchain_renders_every_diagram() {
    let workspace = TempDir::new().unwrap();
    let public_dir = workspace.path().join("public");

    // Fake pdflatex: drop a diagram.pdf into the -output-directory argument.
    let latex = write_script(
        workspace.path(),
        "fake-latex",
        "#!/bin/sh\nprev=\"\"\nfor a in \"$@\"; do\n  if [ \"$prev\" = \"-output-directory\" ]; then outdir=\"$a\"; fi\n  prev=\"$a\"\ndone\necho pdf > \"$outdir/diagram.pdf\"\n",
    );
    // Fake rasteriser: write the destination PNG (its last argument).
    let raster = write_script(
        workspace.path(),
        "fake-raster",
        "#!/bin/sh\nfor a in \"$@\"; do last=\"$a\"; done\necho png > \"$last\"\n",
    );

    let config = ConversionConfig::builder()
        .public_dir(&public_dir)
        .latex_command(latex.display().to_string())
        .raster_command(raster.display().to_string())
        .converter(Arc::new(IdentityConverter))
        .build()
        .unwrap();

    let source = write_chapter(
        workspace.path(),
        "trees.tex",
        "\\chapter{Trees}\n\\begin{tikzpicture}\\node {a};\\end{tikzpicture}\nmid\n\\begin{tikzpicture}\\node {b};\\end{tikzpicture}\n",
    );

    let output = convert(&source, &config).unwrap();
    assert_eq!(output.stats.diagrams_rendered, 2);
    assert_eq!(output.stats.diagrams_failed, 0);
    assert_eq!(output.mdx.matches("<img src=\"/figures/trees/diagram_").count(), 2);
    assert!(!output.mdx.contains("tikzpicture"));

    // The PNGs actually landed in the public asset tree.
    let asset_dir = public_dir.join("figures/trees");
    let pngs = fs::read_dir(&asset_dir).unwrap().count();
    assert_eq!(pngs, 2);
}

#[test]
fn unavailable_toolchain_leaves_literal_blocks() {
    let workspace = TempDir::new().unwrap();
    let config = base_config(&workspace.path().join("public"));
    let source = write_chapter(
        workspace.path(),
        "trees.tex",
        "\\chapter{Trees}\n\\begin{tikzpicture}\\node {a};\\end{tikzpicture}\nmid\n\\begin{tikzpicture}\\node {b};\\end{tikzpicture}\n",
    );

    let output = convert(&source, &config).unwrap();
    assert_eq!(output.stats.diagrams_failed, 2);
    assert_eq!(output.mdx.matches("\\begin{tikzpicture}").count(), 2);
    assert!(!output.mdx.contains("<img src=\"/figures/trees/diagram_"));
}
