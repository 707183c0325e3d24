//! Subfigure grouping: restructure multi-image figures before conversion.
//!
//! ## Why before the converter?
//!
//! pandoc flattens `subfigure` environments into a bare run of images and
//! loses which caption belonged to which image and which figure grouped them.
//! That structure cannot be reconstructed afterwards, so this stage rewrites
//! each qualifying figure block into the target grid markup while the LaTeX
//! source still carries the grouping.
//!
//! A figure block that matches the outer pattern but yields zero nested
//! images is returned verbatim — degrade-to-noop, not an error.

use super::ImageReference;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

static RE_FIGURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\\begin\{figure\}(?:\[[^\]]*\])?(.*?)\\end\{figure\}").unwrap()
});
static RE_SUBFIGURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\\begin\{subfigure\}(?:\[[^\]]*\])?(?:\{[^}]*\})?(.*?)\\end\{subfigure\}")
        .unwrap()
});
static RE_GRAPHIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\includegraphics(?:\[([^\]]*)\])?\{([^}]*)\}").unwrap());
static RE_CAPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\caption\{([^}]*)\}").unwrap());

/// An ordered group of sub-images sharing one outer caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubfigureGroup {
    pub images: Vec<ImageReference>,
    pub caption: Option<String>,
}

/// Rewrite every figure block containing ≥1 subfigure into a grid container.
///
/// Returns the rewritten text and the number of groups restructured.
pub fn group_subfigures(text: &str) -> (String, usize) {
    let mut groups = 0usize;
    let rewritten = RE_FIGURE.replace_all(text, |caps: &Captures<'_>| {
        match extract_group(&caps[1]) {
            Some(group) => {
                groups += 1;
                debug!("Restructured figure into {}-image grid", group.images.len());
                render_grid(&group)
            }
            // No nested sub-images: not a subfigure group, leave untouched.
            None => caps[0].to_string(),
        }
    });
    (rewritten.into_owned(), groups)
}

/// Extract an ordered subfigure group from a figure body, or `None` when the
/// body holds no usable sub-image (the pass-through case).
fn extract_group(body: &str) -> Option<SubfigureGroup> {
    let mut images = Vec::new();
    for sub in RE_SUBFIGURE.captures_iter(body) {
        let sub_body = &sub[1];
        // A subfigure without an image contributes nothing to the grid.
        let Some(graphic) = RE_GRAPHIC.captures(sub_body) else {
            continue;
        };
        images.push(ImageReference {
            path: graphic[2].trim().to_string(),
            caption: RE_CAPTION
                .captures(sub_body)
                .map(|c| c[1].trim().to_string()),
            width_hint: graphic.get(1).map(|m| m.as_str().to_string()),
        });
    }
    if images.is_empty() {
        return None;
    }

    // The group caption is whatever \caption remains once the subfigure
    // spans are cut out; searching the full body would find a sub-caption.
    let remainder = RE_SUBFIGURE.replace_all(body, "");
    let caption = RE_CAPTION
        .captures(&remainder)
        .map(|c| c[1].trim().to_string());

    Some(SubfigureGroup { images, caption })
}

/// Render a group as grid markup: one `<figure>` entry per sub-image in
/// source order, followed by the outer caption when present.
fn render_grid(group: &SubfigureGroup) -> String {
    let mut out = String::from("<div className=\"subfigure-grid\">\n");
    for image in &group.images {
        out.push_str("<figure>\n");
        match &image.caption {
            Some(caption) => {
                out.push_str(&format!("<img src=\"{}\" alt=\"{}\" />\n", image.path, caption));
                out.push_str(&format!("<figcaption>{}</figcaption>\n", caption));
            }
            None => {
                out.push_str(&format!("<img src=\"{}\" alt=\"\" />\n", image.path));
            }
        }
        out.push_str("</figure>\n");
    }
    out.push_str("</div>");
    if let Some(caption) = &group.caption {
        out.push_str(&format!("\n<figcaption>{}</figcaption>", caption));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SUBFIGS: &str = r"\begin{figure}[h]
\centering
\begin{subfigure}[t]{0.45\textwidth}
\includegraphics[width=\textwidth]{a.png}
\caption{A}
\end{subfigure}
\begin{subfigure}[t]{0.45\textwidth}
\includegraphics[width=\textwidth]{b.png}
\caption{B}
\end{subfigure}
\caption{Both diagrams}
\end{figure}";

    #[test]
    fn two_subfigures_become_grid_in_source_order() {
        let (out, groups) = group_subfigures(TWO_SUBFIGS);
        assert_eq!(groups, 1);
        assert!(out.contains("<div className=\"subfigure-grid\">"));
        let a = out.find("src=\"a.png\"").expect("first image present");
        let b = out.find("src=\"b.png\"").expect("second image present");
        assert!(a < b, "entries must keep source order");
        assert!(out.contains("<figcaption>A</figcaption>"));
        assert!(out.contains("<figcaption>B</figcaption>"));
        assert!(out.ends_with("<figcaption>Both diagrams</figcaption>"));
        assert!(!out.contains("\\begin{figure}"));
    }

    #[test]
    fn outer_caption_not_confused_with_sub_captions() {
        let (out, _) = group_subfigures(TWO_SUBFIGS);
        // The group caption must be the outer one, not "A".
        assert!(out.trim_end().ends_with("<figcaption>Both diagrams</figcaption>"));
    }

    #[test]
    fn plain_figure_passes_through_verbatim() {
        let input = r"\begin{figure}
\includegraphics{solo.png}
\caption{Solo}
\end{figure}";
        let (out, groups) = group_subfigures(input);
        assert_eq!(groups, 0);
        assert_eq!(out, input);
    }

    #[test]
    fn subfigure_without_image_degrades_to_noop() {
        let input = r"\begin{figure}
\begin{subfigure}{0.5\textwidth}
\caption{no image here}
\end{subfigure}
\end{figure}";
        let (out, groups) = group_subfigures(input);
        assert_eq!(groups, 0);
        assert_eq!(out, input);
    }

    #[test]
    fn group_without_outer_caption() {
        let input = r"\begin{figure}
\begin{subfigure}{0.5\textwidth}
\includegraphics{only.png}
\end{subfigure}
\end{figure}";
        let (out, groups) = group_subfigures(input);
        assert_eq!(groups, 1);
        assert!(out.contains("src=\"only.png\""));
        assert!(!out.contains("<figcaption>"));
    }
}
