//! Text clean-up applied to model output.

use regex::Regex;
use std::sync::LazyLock;

static NON_TITLE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("Invalid regex"));

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Placeholder used when no executive summary can be derived.
pub const NO_SUMMARY: &str = "Summary not available";

/// Label for a section whose title could not be generated.
pub fn fallback_title(section_id: usize) -> String {
    format!("Section {}", section_id)
}

/// Reduce a model reply to a plain title: first line, no quotes, only word characters,
/// whitespace and hyphens. Empty results fall back to "Section N".
pub fn sanitize_title(raw: &str, section_id: usize) -> String {
    let first_line = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .lines()
        .next()
        .unwrap_or_default();

    let cleaned = NON_TITLE_CHARS_RE.replace_all(first_line, "");
    let title = WHITESPACE_RE.replace_all(cleaned.trim(), " ").to_string();

    if title.is_empty() {
        fallback_title(section_id)
    } else {
        title
    }
}

/// First `max_lines` non-empty, non-heading lines joined with spaces.
pub fn executive_summary(full_summary: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = full_summary
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .take(max_lines)
        .collect();

    if lines.is_empty() {
        NO_SUMMARY.to_string()
    } else {
        lines.join(" ")
    }
}

/// At most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
