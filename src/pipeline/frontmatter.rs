//! Optional YAML frontmatter stage.
//!
//! An explicit, composable stage rather than a pipeline fork: the primary
//! pipeline emits no frontmatter, and callers opt in through
//! [`crate::config::ConversionConfig::include_frontmatter`].

/// Prepend a `title`/`description` frontmatter block to the document.
pub fn prepend_frontmatter(content: &str, title: &str) -> String {
    let safe = title.replace('\\', "\\\\").replace('"', "\\\"");
    format!("---\ntitle: \"{safe}\"\ndescription: \"{safe}\"\n---\n\n{content}")
}
