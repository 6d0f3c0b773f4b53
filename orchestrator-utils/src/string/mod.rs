//! Text helpers for prompt budgeting and export naming

use regex::Regex;
use std::sync::OnceLock;

/// Outcome of a character-bounded truncation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated<'a> {
    /// The retained prefix
    pub text: &'a str,
    /// Whether anything was cut
    pub was_cut: bool,
}

/// Keep at most `max_chars` Unicode scalar values of `text`.
///
/// Counts characters, not bytes, so the returned prefix always sits on a
/// char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> Truncated<'_> {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Truncated {
            text: &text[..byte_idx],
            was_cut: true,
        },
        None => Truncated {
            text,
            was_cut: false,
        },
    }
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex is valid"))
}

/// Replace each whitespace run with `-` and lowercase the result.
///
/// Nothing else is stripped: `"My App.zip"` becomes `"my-app.zip"`.
pub fn slugify(name: &str) -> String {
    whitespace_run().replace_all(name, "-").to_lowercase()
}
