//! Output types returned by the conversion entry points.

use serde::{Deserialize, Serialize};

/// Result of converting one chapter.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// The fully transformed MDX document.
    pub mdx: String,
    /// Chapter title extracted from the source ("Untitled" if undeclared).
    pub title: String,
    /// Chapter slug: namespace key for all generated asset paths.
    pub chapter: String,
    /// Per-stage counters for reporting.
    pub stats: ConversionStats,
}

/// Counters describing what the pipeline did to one chapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// TikZ diagrams rendered to PNG assets.
    pub diagrams_rendered: usize,
    /// TikZ diagrams that fell back to a literal source block.
    pub diagrams_failed: usize,
    /// Figure blocks restructured into subfigure grids.
    pub subfigure_groups: usize,
    /// Residual single-image figures rewritten to image tags.
    pub figures_resolved: usize,
    /// Wall-clock duration of the whole conversion.
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialise_to_json() {
        let stats = ConversionStats {
            diagrams_rendered: 2,
            diagrams_failed: 1,
            subfigure_groups: 1,
            figures_resolved: 3,
            duration_ms: 42,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"diagrams_rendered\":2"));
        assert!(json.contains("\"duration_ms\":42"));
    }
}
