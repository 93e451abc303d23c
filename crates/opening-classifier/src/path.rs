//! Hierarchical opening paths built from catalogue names.
//!
//! A name such as `Sicilian Defense: Najdorf Variation, English Attack`
//! becomes `["Najdorf Variation", "English Attack", "Sicilian Defense",
//! "King's Pawn Game"]`: variation-level fragments first, then the family,
//! then the first-move label.

use regex::Regex;
use std::sync::LazyLock;

use crate::first_moves::FirstMoveTable;

static PARENTHETICAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());
static MOVE_ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*\.+\s*[A-Za-z0-9][^\s,]*").unwrap());
static ELLIPSIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{2,}|…").unwrap());

/// Specificity of an opening name: colons and commas mark deeper levels,
/// and longer names tend to be narrower.
pub fn specificity(name: &str) -> i64 {
    let colons = name.matches(':').count() as i64;
    let commas = name.matches(',').count() as i64;
    50 * colons + 5 * commas + name.chars().count() as i64
}

/// Split a raw catalogue name into path fragments, most specific first,
/// ending with the first-move family label when one is known.
pub fn build_path(name: &str, first_move: Option<&str>, first_moves: &FirstMoveTable) -> Vec<String> {
    let mut path = Vec::new();

    match name.split_once(':') {
        Some((family, variation)) => {
            let cleaned = clean_variation(variation);
            for fragment in split_fragments(&cleaned) {
                push_unique(&mut path, fragment);
            }
            for fragment in split_fragments(family) {
                push_unique(&mut path, fragment);
            }
        }
        None => {
            for fragment in split_fragments(name) {
                push_unique(&mut path, fragment);
            }
        }
    }

    append_first_move(&mut path, first_move, first_moves);
    path
}

/// Append the first-move family label unless one of its aliases is already present.
pub fn append_first_move(path: &mut Vec<String>, first_move: Option<&str>, first_moves: &FirstMoveTable) {
    let Some(mv) = first_move else {
        return;
    };
    let labels = first_moves.labels(mv);
    if let Some(primary) = labels.first() {
        if !labels.iter().any(|l| path.contains(l)) {
            path.push(primary.clone());
        }
    }
}

/// Flatten several paths into one, keeping the first occurrence of each fragment.
pub fn merge_paths<I>(paths: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut merged = Vec::new();
    for fragment in paths.into_iter().flatten() {
        push_unique(&mut merged, fragment);
    }
    merged
}

fn clean_variation(text: &str) -> String {
    let no_parens = PARENTHETICAL_RE.replace_all(text, " ");
    let no_moves = MOVE_ANNOTATION_RE.replace_all(&no_parens, " ");
    ELLIPSIS_RE.replace_all(&no_moves, " ").into_owned()
}

fn split_fragments(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(',')
        .map(|f| f.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|f| !f.is_empty())
}

fn push_unique(path: &mut Vec<String>, fragment: String) {
    if !path.contains(&fragment) {
        path.push(fragment);
    }
}
