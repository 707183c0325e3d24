//! Post-processing: deterministic cleanup of converter-generated Markdown.
//!
//! ## Why is post-processing necessary?
//!
//! The generic converter produces Markdown that is *textually correct* but
//! *structurally wrong* for an MDX pipeline:
//!
//! - Literal `{`/`}` collide with the templating syntax and must be escaped
//! - Code fences carry converter-specific `{.lang language="…"}` attributes
//! - Inline math arrives as `\( … \)` instead of `$ … $`
//! - Set-builder notation comes out double-escaped (`\\{ … \\}`)
//! - `::: center` blocks that were definition tables lose their structure
//! - `\label`/cross-reference remnants litter the text
//!
//! This module applies cheap, deterministic regex/string rules that fix those
//! artefacts without touching content. Each rule is independently testable.
//!
//! ## Rule Order
//!
//! The documented order is normative: brace escaping must run before table
//! reformatting (which reinserts literal braces as HTML entities), and label
//! stripping runs last so its blank-line collapse sees the final text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Apply all post-processing rules to the converted Markdown.
///
/// Runs the cleanup passes in a defined order. Each pass is a pure function
/// (`&str → String`) with no shared state.
///
/// Rules (applied in order):
/// 1. Escape unescaped braces (code blocks and verbatim spans excluded)
/// 2. Strip converter language tags from code fences
/// 3. Normalise inline math delimiters (`\( … \)` → `$ … $`)
/// 4. Collapse double-escaped set notation
/// 5. Reformat `::: center` blocks into Property/Definition tables
/// 6. Strip labels and cross-reference remnants, collapse blank-line runs
pub fn clean_markdown(input: &str) -> String {
    let s = escape_braces(input);
    let s = strip_code_language_tags(&s);
    let s = fix_math_delimiters(&s);
    let s = fix_set_notation(&s);
    let s = format_tables(&s);
    remove_labels(&s)
}

// ── Rule 1: Escape braces ────────────────────────────────────────────────────
//
// MDX treats `{ … }` as an expression; every brace the document means
// literally must arrive escaped. Already-escaped braces (preceded by a
// backslash) are left alone, and preformatted regions keep their content
// byte-for-byte.

static RE_FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static RE_VERBATIM_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\begin\{verbatim\}.*?\\end\{verbatim\}").unwrap());

/// Byte ranges the escape pass must not touch: fenced code blocks and
/// verbatim environments (un-rendered diagram fallbacks).
fn protected_spans(input: &str) -> Vec<(usize, usize)> {
    let mut spans: Vec<(usize, usize)> = RE_FENCED_BLOCK
        .find_iter(input)
        .chain(RE_VERBATIM_BLOCK.find_iter(input))
        .map(|m| (m.start(), m.end()))
        .collect();
    spans.sort_unstable();
    // Merge overlaps so the scanner below can treat spans as disjoint.
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some((_, prev_end)) if start <= *prev_end => *prev_end = (*prev_end).max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Escape every `{`/`}` not already preceded by a backslash, outside
/// preformatted regions.
fn escape_braces(input: &str) -> String {
    let spans = protected_spans(input);
    let mut out = String::with_capacity(input.len() + 32);
    let mut span_idx = 0usize;
    let mut prev: Option<char> = None;

    for (pos, ch) in input.char_indices() {
        while span_idx < spans.len() && pos >= spans[span_idx].1 {
            span_idx += 1;
        }
        let in_protected = spans
            .get(span_idx)
            .is_some_and(|&(start, end)| pos >= start && pos < end);

        if !in_protected && (ch == '{' || ch == '}') && prev != Some('\\') {
            out.push('\\');
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}

// ── Rule 2: Strip code-language tags ─────────────────────────────────────────

static RE_LANG_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"``` \{\.[a-zA-Z]+\s+language="[^"]+"\}"#).unwrap());
static RE_CODE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(.*?)```").unwrap());
static RE_LANG_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\{\.[a-zA-Z]+\s+language="[^"]+"\}"#).unwrap());

/// Rewrite annotated code fences to plain ones, preserving (trimmed) content.
fn strip_code_language_tags(input: &str) -> String {
    let s = RE_LANG_FENCE.replace_all(input, "```");
    RE_CODE_BLOCK
        .replace_all(&s, |caps: &Captures<'_>| {
            let code = RE_LANG_ATTR.replace_all(&caps[1], "");
            format!("```\n{}\n```", code.trim())
        })
        .into_owned()
}

// ── Rule 3: Math delimiters ──────────────────────────────────────────────────

static RE_INLINE_MATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\\\((.*?)\\\)").unwrap());

/// `\( … \)` → `$ … $`. Display math is left as the converter produced it.
fn fix_math_delimiters(input: &str) -> String {
    RE_INLINE_MATH.replace_all(input, "$$${1}$$").into_owned()
}

// ── Rule 4: Set notation ─────────────────────────────────────────────────────
//
// The converter double-escapes braces in set-builder notation; collapse back
// to the single-escaped form the escape pass would have produced.

static RE_EMPTY_SET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\\\{\\\\\}").unwrap());
static RE_SET_BODY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\\\{([^}]*)\\\\\}").unwrap());

fn fix_set_notation(input: &str) -> String {
    let s = RE_EMPTY_SET.replace_all(input, r"\{\}");
    RE_SET_BODY.replace_all(&s, r"\{${1}\}").into_owned()
}

// ── Rule 5: Table reformatting ───────────────────────────────────────────────
//
// `::: center` blocks in this corpus are definition tables: one property per
// line, definition starting at the first math delimiter. Separator-only lines
// are noise. Braces become HTML entities so MDX cannot re-interpret the cells.

static RE_CENTER_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)::: center\n(.*?)\n:::").unwrap());

fn format_tables(input: &str) -> String {
    RE_CENTER_BLOCK
        .replace_all(input, |caps: &Captures<'_>| {
            let mut rows = Vec::new();
            for line in caps[1].lines().map(str::trim).filter(|l| !l.is_empty()) {
                if line.contains("----") {
                    continue;
                }
                let mut parts = line.splitn(3, '$');
                let property = parts.next().unwrap_or("").trim().to_string();
                let rest: Vec<&str> = parts.collect();
                if rest.is_empty() {
                    continue;
                }
                let definition = format!("${}", rest.join("$"));
                rows.push(format!(
                    "| {} | {} |",
                    entity_escape_braces(&property),
                    entity_escape_braces(&definition)
                ));
            }
            let mut table =
                String::from("| Property | Definition |\n|-------------|---------------|\n");
            table.push_str(&rows.join("\n"));
            table
        })
        .into_owned()
}

fn entity_escape_braces(cell: &str) -> String {
    cell.replace("\\{", "&#123;")
        .replace("\\}", "&#125;")
        .replace('{', "&#123;")
        .replace('}', "&#125;")
}

// ── Rule 6: Label and cross-reference stripping ──────────────────────────────
//
// Patterns tolerate an optional escaping backslash before braces because the
// escape pass has already run over these remnants.

static RE_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\label\\?\{[^}]*\}").unwrap());
static RE_ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\?\{#[^}]*\}").unwrap());
static RE_REF_ATTRS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\\?\{reference-type="[^"]*"\s+reference="[^"]*"\\?\}"#).unwrap()
});
static RE_REF_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[.*?\]\]\(#.*?\)").unwrap());
static RE_HEADING_TRAILER: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\s+([^\\]+)\\").unwrap());
static RE_EMPTY_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\]\s*\n").unwrap());
static RE_TABLE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"Table \[\[.*?\]\]").unwrap());
static RE_PAREN_ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(#.*?\)").unwrap());
static RE_BRACKET_REMNANT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[.*?\]\]").unwrap());
static RE_BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").unwrap());

fn remove_labels(input: &str) -> String {
    let s = RE_LABEL.replace_all(input, "");
    let s = RE_ANCHOR.replace_all(&s, "");
    let s = RE_REF_ATTRS.replace_all(&s, "");
    let s = RE_REF_LINK.replace_all(&s, "");
    let s = RE_HEADING_TRAILER.replace_all(&s, "# ${1}");
    let s = RE_EMPTY_BRACKETS.replace_all(&s, "\n");
    let s = RE_TABLE_REF.replace_all(&s, "Table");
    let s = RE_PAREN_ANCHOR.replace_all(&s, "");
    let s = RE_BRACKET_REMNANT.replace_all(&s, "");
    RE_BLANK_RUN.replace_all(&s, "\n\n").into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────
