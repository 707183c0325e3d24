//! Image resolution: rewrite residual figure/image macros left in the
//! converted text.
//!
//! Subfigure groups are restructured before conversion; what reaches this
//! stage are the two simpler shapes the converter passes through mangled:
//!
//! (a) a bare `\includegraphics` anywhere in the text, optionally followed
//!     immediately by a `\caption`;
//! (b) a `figure` environment wrapping exactly one `\includegraphics`.
//!
//! Both become an image tag, or a `<figure>`/`<figcaption>` pair when a
//! caption is present. Width options are parsed but never emitted —
//! presentation belongs to the target renderer (see the style stripper).
//!
//! Resolution is best-effort: an unmatched or ambiguous block is returned
//! unchanged. The patterns tolerate the escaping backslashes the brace-escape
//! pass has already inserted.

use super::paths::canonical_figure_path;
use super::ImageReference;
use crate::chapter::ChapterContext;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

static RE_FIGURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\\begin\\?\{figure\\?\}(?:\[[^\]]*\])?(.*?)\\end\\?\{figure\\?\}").unwrap()
});
static RE_GRAPHIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\includegraphics(?:\[([^\]]*)\])?\\?\{([^}\\]*)\\?\}").unwrap()
});
static RE_CAPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\caption\\?\{([^}]*?)\\?\}").unwrap());
static RE_BARE_GRAPHIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)\\includegraphics(?:\[([^\]]*)\])?\\?\{([^}\\]*)\\?\}(?:[ \t]*\n?[ \t]*\\caption\\?\{([^}]*?)\\?\})?",
    )
    .unwrap()
});

/// Rewrite residual figures and bare image inclusions to image tags.
///
/// Returns the rewritten text and the number of references resolved.
pub fn resolve_images(text: &str, ctx: &ChapterContext) -> (String, usize) {
    let mut resolved = 0usize;

    // Figure environments first, so the bare pass never eats a figure's
    // internals out from under it.
    let pass_one = RE_FIGURE.replace_all(text, |caps: &Captures<'_>| {
        let body = &caps[1];
        if body.contains("subfigure") {
            // A surviving subfigure group is not ours to guess at.
            return caps[0].to_string();
        }
        let graphics: Vec<Captures<'_>> = RE_GRAPHIC.captures_iter(body).collect();
        // Exactly one image, or the shape is not what we expect.
        let [graphic] = graphics.as_slice() else {
            return caps[0].to_string();
        };
        resolved += 1;
        let image = image_reference(graphic, RE_CAPTION.captures(body));
        render_image(&image, ctx)
    });

    let pass_two = RE_BARE_GRAPHIC.replace_all(&pass_one, |caps: &Captures<'_>| {
        resolved += 1;
        let image = ImageReference {
            path: caps[2].trim().to_string(),
            caption: caps.get(3).map(|m| m.as_str().trim().to_string()),
            width_hint: caps.get(1).map(|m| m.as_str().to_string()),
        };
        render_image(&image, ctx)
    });

    if resolved > 0 {
        debug!("Resolved {} residual image reference(s)", resolved);
    }
    (pass_two.into_owned(), resolved)
}

fn image_reference(graphic: &Captures<'_>, caption: Option<Captures<'_>>) -> ImageReference {
    ImageReference {
        path: graphic[2].trim().to_string(),
        caption: caption.map(|c| c[1].trim().to_string()),
        width_hint: graphic.get(1).map(|m| m.as_str().to_string()),
    }
}

fn render_image(image: &ImageReference, ctx: &ChapterContext) -> String {
    let src = canonical_figure_path(&image.path, ctx);
    match &image.caption {
        Some(caption) => format!(
            "<figure>\n  <img src=\"{src}\" alt=\"{caption}\" />\n  <figcaption>{caption}</figcaption>\n</figure>"
        ),
        None => format!("<img src=\"{src}\" alt=\"\" />"),
    }
}
