//! Candidate scoring: picks the single best catalogue entry for a played
//! position.
//!
//! Entries sharing the position's canonical key are filtered by move order
//! (a transposition is not a move-order match) and ranked lexicographically
//! by a fixed list of criteria, every criterion descending.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalogue::{Catalogue, OpeningEntry};
use crate::path::specificity;

/// One ranking criterion. Booleans rank `true` above `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// The entry reaches the key at exactly the played ply.
    SamePly,
    /// The entry reaches the key by replay (not only as a declared position).
    ReachesKey,
    CommonPrefix,
    /// Every entry move has already been played, in order.
    FullyMatched,
    /// Fewer entry moves rank higher.
    Shorter,
    Specificity,
    SetMatch,
}

const DEFAULT_ORDER: [Criterion; 7] = [
    Criterion::SamePly,
    Criterion::ReachesKey,
    Criterion::CommonPrefix,
    Criterion::FullyMatched,
    Criterion::Shorter,
    Criterion::Specificity,
    Criterion::SetMatch,
];

const PREFER_SET_ORDER: [Criterion; 7] = [
    Criterion::SetMatch,
    Criterion::SamePly,
    Criterion::ReachesKey,
    Criterion::CommonPrefix,
    Criterion::FullyMatched,
    Criterion::Shorter,
    Criterion::Specificity,
];

/// Criterion priority used to rank candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOrder {
    #[default]
    Default,
    /// Set-match promoted to the first criterion.
    PreferSetMatch,
}

impl ScoreOrder {
    pub fn criteria(self) -> &'static [Criterion] {
        match self {
            ScoreOrder::Default => &DEFAULT_ORDER,
            ScoreOrder::PreferSetMatch => &PREFER_SET_ORDER,
        }
    }
}

/// Multiset of the tokens played anywhere in a game.
#[derive(Debug, Clone, Default)]
pub struct TokenBag {
    counts: HashMap<String, usize>,
}

impl TokenBag {
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut counts = HashMap::new();
        for token in tokens {
            *counts.entry(token.as_ref().to_string()).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Fraction of `tokens` found in the bag, each bag occurrence used once.
    /// An empty token list matches nothing.
    pub fn match_fraction<S: AsRef<str>>(&self, tokens: &[S]) -> f64 {
        if tokens.is_empty() {
            return 0.0;
        }

        let mut remaining = self.counts.clone();
        let mut matched = 0usize;
        for token in tokens {
            if let Some(count) = remaining.get_mut(token.as_ref()) {
                if *count > 0 {
                    *count -= 1;
                    matched += 1;
                }
            }
        }
        matched as f64 / tokens.len() as f64
    }
}

/// Everything the scorer needs to know about one played position.
#[derive(Debug, Clone, Copy)]
pub struct MatchQuery<'q> {
    pub key: &'q str,
    pub ply: usize,
    /// Played tokens from ply 1 through `ply`.
    pub prefix: &'q [String],
    pub game: &'q TokenBag,
    /// Admit move-order mismatches when they are set-matched.
    pub orderless: bool,
    /// Set-match threshold in `[0, 1]`.
    pub threshold: f64,
    pub order: ScoreOrder,
}

/// A scored catalogue entry. Ephemeral; lives only for one query.
#[derive(Debug, Clone)]
pub struct MatchCandidate<'c> {
    pub entry: &'c OpeningEntry,
    pub raw_name: &'c str,
    pub entry_tokens: &'c [String],
    pub same_ply: bool,
    pub reaches_key: bool,
    pub common_prefix: usize,
    pub fully_matched: bool,
    pub specificity: i64,
    pub set_match_fraction: f64,
    pub set_matched: bool,
    pub ordering_key: Vec<i64>,
}

impl<'c> MatchCandidate<'c> {
    fn criterion_value(&self, criterion: Criterion) -> i64 {
        match criterion {
            Criterion::SamePly => self.same_ply as i64,
            Criterion::ReachesKey => self.reaches_key as i64,
            Criterion::CommonPrefix => self.common_prefix as i64,
            Criterion::FullyMatched => self.fully_matched as i64,
            Criterion::Shorter => -(self.entry_tokens.len() as i64),
            Criterion::Specificity => self.specificity,
            Criterion::SetMatch => self.set_matched as i64,
        }
    }
}

/// Length of the shared leading run of two token lists.
pub fn common_prefix_len<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> usize {
    a.iter()
        .zip(b)
        .take_while(|(x, y)| x.as_ref() == y.as_ref())
        .count()
}

/// True when the two lists agree at every index both have.
pub fn prefix_consistent<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> bool {
    common_prefix_len(a, b) == a.len().min(b.len())
}

fn score<'c>(entry: &'c OpeningEntry, query: &MatchQuery<'_>) -> Option<MatchCandidate<'c>> {
    let consistent = prefix_consistent(&entry.tokens, query.prefix);
    let set_match_fraction = query.game.match_fraction(&entry.tokens);
    let set_matched = set_match_fraction >= query.threshold;

    if !consistent && !(query.orderless && set_matched) {
        return None;
    }

    let common_prefix = common_prefix_len(&entry.tokens, query.prefix);
    let mut candidate = MatchCandidate {
        entry,
        raw_name: &entry.name,
        entry_tokens: &entry.tokens,
        same_ply: entry.ply_of(query.key) == Some(query.ply),
        reaches_key: entry.reaches(query.key),
        common_prefix,
        fully_matched: !entry.tokens.is_empty() && common_prefix == entry.tokens.len(),
        specificity: specificity(&entry.name),
        set_match_fraction,
        set_matched,
        ordering_key: Vec::new(),
    };
    candidate.ordering_key = query
        .order
        .criteria()
        .iter()
        .map(|c| candidate.criterion_value(*c))
        .collect();

    Some(candidate)
}

/// Every admissible candidate indexed under the query's key, in catalogue order.
pub fn candidates<'c>(catalogue: &'c Catalogue, query: &MatchQuery<'_>) -> Vec<MatchCandidate<'c>> {
    catalogue
        .hits(query.key)
        .iter()
        .filter_map(|hit| catalogue.entry(hit.entry))
        .filter_map(|entry| score(entry, query))
        .collect()
}

/// Highest-ranked candidate; on a complete tie the earlier catalogue entry wins.
pub fn pick_best(candidates: Vec<MatchCandidate<'_>>) -> Option<MatchCandidate<'_>> {
    let mut best: Option<MatchCandidate<'_>> = None;
    for candidate in candidates {
        let better = match &best {
            Some(current) => candidate.ordering_key > current.ordering_key,
            None => true,
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

/// The single best catalogue entry for a played position, if any.
pub fn best_entry<'c>(catalogue: &'c Catalogue, query: &MatchQuery<'_>) -> Option<MatchCandidate<'c>> {
    pick_best(candidates(catalogue, query))
}

/// Position-independent fallback: among entries whose move list starts with
/// `prefix`, the most specific name, then the name shared by the most
/// matching entries, then catalogue order.
pub fn best_sequence_entry<'c>(catalogue: &'c Catalogue, prefix: &[String]) -> Option<&'c OpeningEntry> {
    if prefix.is_empty() {
        return None;
    }

    let matches: Vec<&OpeningEntry> = catalogue
        .entries()
        .iter()
        .filter(|e| e.tokens.len() >= prefix.len() && e.tokens[..prefix.len()] == *prefix)
        .collect();

    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for entry in &matches {
        *frequency.entry(entry.name.as_str()).or_insert(0) += 1;
    }

    let mut best: Option<(&OpeningEntry, (i64, usize))> = None;
    for entry in matches {
        let rank = (specificity(&entry.name), frequency[entry.name.as_str()]);
        if best.as_ref().map_or(true, |(_, r)| rank > *r) {
            best = Some((entry, rank));
        }
    }
    best.map(|(entry, _)| entry)
}
