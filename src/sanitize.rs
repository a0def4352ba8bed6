//! Markup stripping and length budgeting for fetched page bodies.
//!
//! Confluence stores page bodies in its storage format, which is XHTML-like
//! markup. The sanitizer reduces a body to plain text by deleting every
//! angle-bracket tag and trimming the result, then enforces a character
//! budget so a single oversized page cannot blow past the prompt window.

use regex::Regex;
use std::sync::OnceLock;

/// Maximum cleaned length, in characters, before a page body is cut.
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Marker appended to page text cut at [`MAX_CONTENT_CHARS`].
pub const CONTENT_TRUNCATION_MARKER: &str = "... (content truncated)";

/// Plain-text document produced by the sanitizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContent {
    /// Cleaned, possibly truncated, text.
    pub text: String,
    /// Length of the cleaned text, in characters, before truncation.
    pub raw_len: usize,
    /// Whether the text was cut at the budget.
    pub truncated: bool,
}

impl DocumentContent {
    /// A document with no text, standing in for a failed fetch.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            raw_len: 0,
            truncated: false,
        }
    }
}

/// Strip markup from `raw`, trim whitespace, and enforce the length budget.
///
/// Tag removal deletes every substring starting at `<` and ending at the
/// next `>` with at least one character between them. A stray `<` that never
/// closes leaves the rest of the string untouched. Malformed markup never
/// fails; the pass is purely lexical.
pub fn clean(raw: &str) -> DocumentContent {
    let stripped = tag_pattern().replace_all(raw, "");
    let trimmed = stripped.trim();
    let raw_len = trimmed.chars().count();

    if raw_len > MAX_CONTENT_CHARS {
        DocumentContent {
            text: truncate_with_marker(trimmed, MAX_CONTENT_CHARS, CONTENT_TRUNCATION_MARKER),
            raw_len,
            truncated: true,
        }
    } else {
        DocumentContent {
            text: trimmed.to_string(),
            raw_len,
            truncated: false,
        }
    }
}

/// Cut `text` to the first `limit` characters, appending `marker` when cut.
///
/// Counts Unicode scalar values rather than bytes, so the cut can never land
/// inside a code point. Text at or under the limit is returned unchanged.
pub fn truncate_with_marker(text: &str, limit: usize, marker: &str) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit).collect();
    cut.push_str(marker);
    cut
}

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new("<[^>]+>").expect("tag pattern compiles"))
}
