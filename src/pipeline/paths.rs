//! Path canonicalisation: every asset reference ends up in the chapter's
//! namespace.
//!
//! The asset-serving convention is one directory per chapter:
//! `/figures/<chapter>/<file>`. Sources reference images every which way —
//! relative paths, legacy `figures/…` shapes, bare names without an
//! extension — and the converter sometimes drops the leading slash or doubles
//! it. This stage maps them all onto the canonical form.
//!
//! Normalisation is idempotent: `normalize(normalize(p)) == normalize(p)`.

use crate::chapter::ChapterContext;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RE_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").unwrap());
static RE_IMG_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<img src="([^"]*)""#).unwrap());
static RE_MD_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]*)\)").unwrap());

/// Map one raw path onto its canonical public form.
///
/// - URLs and already-absolute paths are left alone (doubled leading slashes
///   collapsed).
/// - Anything else is reduced to its basename, given a `.png` default
///   extension when it has none, and placed under the chapter's namespace.
pub fn canonical_figure_path(raw: &str, ctx: &ChapterContext) -> String {
    let trimmed = raw.trim();
    if RE_SCHEME.is_match(trimmed) {
        return trimmed.to_string();
    }
    if trimmed.starts_with('/') {
        return format!("/{}", trimmed.trim_start_matches('/'));
    }
    let base = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if base.is_empty() {
        // Nothing usable; degrade rather than invent a filename.
        return trimmed.to_string();
    }
    if base.contains('.') {
        format!("{}/{}", ctx.figures_prefix(), base)
    } else {
        format!("{}/{}.png", ctx.figures_prefix(), base)
    }
}

/// Rewrite every image reference (HTML tag or inline Markdown form) onto the
/// canonical path.
pub fn normalize_paths(text: &str, ctx: &ChapterContext) -> String {
    let s = RE_IMG_SRC.replace_all(text, |caps: &Captures<'_>| {
        format!("<img src=\"{}\"", canonical_figure_path(&caps[1], ctx))
    });
    RE_MD_IMAGE
        .replace_all(&s, |caps: &Captures<'_>| {
            format!("![{}]({})", &caps[1], canonical_figure_path(&caps[2], ctx))
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ChapterContext {
        ChapterContext {
            slug: "logic".into(),
            title: "Logic".into(),
        }
    }

    #[test]
    fn relative_path_is_namespaced_by_basename() {
        assert_eq!(
            canonical_figure_path("img/foo.png", &ctx()),
            "/figures/logic/foo.png"
        );
        assert_eq!(canonical_figure_path("foo.png", &ctx()), "/figures/logic/foo.png");
    }

    #[test]
    fn extensionless_path_defaults_to_png() {
        assert_eq!(canonical_figure_path("venn", &ctx()), "/figures/logic/venn.png");
    }

    #[test]
    fn absolute_path_untouched() {
        assert_eq!(
            canonical_figure_path("/figures/logic/foo.png", &ctx()),
            "/figures/logic/foo.png"
        );
    }

    #[test]
    fn doubled_leading_slashes_collapsed() {
        assert_eq!(
            canonical_figure_path("//figures/logic/foo.png", &ctx()),
            "/figures/logic/foo.png"
        );
    }

    #[test]
    fn urls_pass_through() {
        let url = "https://example.org/figures/x.png";
        assert_eq!(canonical_figure_path(url, &ctx()), url);
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "img/foo.png",
            "foo",
            "/figures/logic/foo.png",
            "//figures/logic/foo.png",
            "https://example.org/x.png",
            "legacy/figures/deep/path/asset.jpeg",
        ];
        for raw in inputs {
            let once = canonical_figure_path(raw, &ctx());
            let twice = canonical_figure_path(&once, &ctx());
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn rewrites_html_and_markdown_forms() {
        let input = "<img src=\"a.png\" alt=\"\" />\n![cap](img/b.png)";
        let out = normalize_paths(input, &ctx());
        assert!(out.contains("<img src=\"/figures/logic/a.png\""));
        assert!(out.contains("![cap](/figures/logic/b.png)"));
    }

    #[test]
    fn normalize_paths_idempotent_over_text() {
        let input = "<img src=\"a.png\" alt=\"\" />\n![cap](b)";
        let once = normalize_paths(input, &ctx());
        assert_eq!(normalize_paths(&once, &ctx()), once);
    }
}
