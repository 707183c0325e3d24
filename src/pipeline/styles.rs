//! Style stripping: presentation is owned by the target renderer.
//!
//! The generic converter leaks inline presentational hints — `{width="…"}`
//! attribute blocks on images, `style="…"` attributes on tags, and a known
//! malformed `None{width="…"}` artefact. All of them go. Absence of any such
//! attribute is a no-op; there is no failure mode.
//!
//! Patterns tolerate an optional escaping backslash before braces because the
//! brace-escape pass has already run.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_NONE_ARTIFACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"None\\?\{width="[^"]*"\\?\}"#).unwrap());
static RE_WIDTH_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\\?\{width="[^"]*"(?:\s+height="[^"]*")?\\?\}"#).unwrap()
});
static RE_STYLE_BRACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\\?\{style="[^"]*"\\?\}"#).unwrap());
static RE_STYLE_INLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r#" style="[^"]*""#).unwrap());

/// Remove inline presentational attributes left over from conversion.
pub fn strip_styles(text: &str) -> String {
    let s = RE_NONE_ARTIFACT.replace_all(text, "");
    let s = RE_WIDTH_ATTR.replace_all(&s, "");
    let s = RE_STYLE_BRACE.replace_all(&s, "");
    RE_STYLE_INLINE.replace_all(&s, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_width_attribute_remnant() {
        let input = "![](/figures/ch/a.png){width=\"4cm\"}";
        assert_eq!(strip_styles(input), "![](/figures/ch/a.png)");
    }

    #[test]
    fn removes_escaped_width_attribute() {
        let input = "![](/figures/ch/a.png)\\{width=\"50%\"\\}";
        assert_eq!(strip_styles(input), "![](/figures/ch/a.png)");
    }

    #[test]
    fn removes_width_and_height_pair() {
        let input = "img{width=\"4cm\" height=\"2cm\"} tail";
        assert_eq!(strip_styles(input), "img tail");
    }

    #[test]
    fn removes_none_width_artifact() {
        let input = "before None{width=\"3cm\"} after";
        assert_eq!(strip_styles(input), "before  after");
    }

    #[test]
    fn removes_inline_style_attribute() {
        let input = "<img src=\"/figures/ch/a.png\" style=\"width: 50%\" alt=\"\" />";
        assert_eq!(strip_styles(input), "<img src=\"/figures/ch/a.png\" alt=\"\" />");
    }

    #[test]
    fn text_without_styles_is_noop() {
        let input = "plain paragraph with {braces} but no attributes";
        assert_eq!(strip_styles(input), input);
    }
}
