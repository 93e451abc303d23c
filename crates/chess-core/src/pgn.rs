//! PGN movetext utilities: lightweight regex-based cleanup.
//!
//! Turns free-form move-list text (full PGN, bare movetext, or a plain list of
//! coordinate moves) into an ordered list of move tokens.

use regex::Regex;
use std::sync::LazyLock;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^}]*\}").unwrap());
static LINE_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r";[^\n]*").unwrap());
static NAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\d+").unwrap());
static MOVE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\s*\.+").unwrap());

const RESULT_MARKERS: [&str; 5] = ["1-0", "0-1", "1/2-1/2", "½-½", "*"];

/// Remove headers, comments, variations, NAGs and move numbers from movetext.
///
/// Result markers are left in place; `split_tokens` drops them.
pub fn strip_annotations(text: &str) -> String {
    let no_headers = HEADER_RE.replace_all(text, " ");
    let no_comments = COMMENT_RE.replace_all(&no_headers, " ");
    let no_line_comments = LINE_COMMENT_RE.replace_all(&no_comments, " ");
    let no_variations = strip_variations(&no_line_comments);
    let no_nags = NAG_RE.replace_all(&no_variations, " ");
    MOVE_NUMBER_RE.replace_all(&no_nags, " ").into_owned()
}

/// Variations nest, so a regex is not enough here.
fn strip_variations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;

    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                out.push(' ');
            }
            ')' => {
                depth = depth.saturating_sub(1);
                out.push(' ');
            }
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }

    out
}

pub fn is_result_marker(token: &str) -> bool {
    RESULT_MARKERS.contains(&token)
}

/// Normalize a single move token: drop check/annotation suffixes and
/// zero-castling spellings.
pub fn normalize_token(token: &str) -> String {
    let trimmed = token.trim();
    let trimmed = trimmed.strip_suffix("e.p.").unwrap_or(trimmed);
    let core = trimmed.trim_end_matches(['+', '#', '!', '?']);

    match core {
        "0-0" | "o-o" => "O-O".to_string(),
        "0-0-0" | "o-o-o" => "O-O-O".to_string(),
        _ => core.to_string(),
    }
}

/// Split movetext into normalized move-token candidates.
pub fn split_tokens(text: &str) -> Vec<String> {
    strip_annotations(text)
        .split_whitespace()
        .filter(|t| !is_result_marker(t))
        .map(normalize_token)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Normalize a catalogue move list to single-spaced tokens without move numbers.
pub fn normalize_movetext(text: &str) -> String {
    split_tokens(text).join(" ")
}

/// Render tokens as numbered movetext, e.g. `1. e4 e5 2. Nf3`.
pub fn format_movetext<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        if i % 2 == 0 {
            out.push_str(&format!("{}. ", i / 2 + 1));
        }
        out.push_str(token.as_ref());
    }
    out
}

/// Extract a string value from a PGN header (e.g. ECO, Opening).
pub fn extract_header(pgn: &str, header_name: &str) -> Option<String> {
    let pattern = format!(r#"\[{}\s+"([^"]*)"\]"#, regex::escape(header_name));
    let re = Regex::new(&pattern).ok()?;
    let value = re.captures(pgn)?.get(1)?.as_str().to_string();
    if value.is_empty() { None } else { Some(value) }
}
