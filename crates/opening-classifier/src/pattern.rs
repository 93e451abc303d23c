//! Named-system detection from White's early moves.
//!
//! Some systems are recognised by their set-up rather than by move order
//! (the London System is Bf4 after d4 with e3/c3, in almost any order).
//! When the catalogue lookup fails or stops short of the system, a detected
//! system either points at a catalogue entry that names it or is reported on
//! its own.

use chess_core::ReplayedGame;

use crate::catalogue::{Catalogue, OpeningEntry};
use crate::path::specificity;

/// A set-up pattern over White's moves within the first `window` plies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRule {
    pub label: &'static str,
    /// The move that identifies the system.
    pub diagnostic: &'static str,
    /// Any of these before the diagnostic move rules the system out.
    pub disqualifiers: &'static [&'static str],
    /// All of these must be played within the window.
    pub required: &'static [&'static str],
    /// At least one of these must come before the diagnostic move or within
    /// White's first `early_moves` moves. Empty means no constraint.
    pub supporting: &'static [&'static str],
    pub window: usize,
    pub early_moves: usize,
}

pub const DEFAULT_WINDOW: usize = 16;

pub const LONDON_SYSTEM: PatternRule = PatternRule {
    label: "London System",
    diagnostic: "Bf4",
    disqualifiers: &["c4"],
    required: &["d4"],
    supporting: &["e3", "c3"],
    window: DEFAULT_WINDOW,
    early_moves: 4,
};

pub const COLLE_SYSTEM: PatternRule = PatternRule {
    label: "Colle System",
    diagnostic: "Bd3",
    disqualifiers: &["c4", "e4", "Bf4", "Bg5"],
    required: &["d4", "e3"],
    supporting: &["Nf3", "c3", "Nbd2"],
    window: DEFAULT_WINDOW,
    early_moves: 5,
};

pub fn default_patterns() -> Vec<PatternRule> {
    vec![LONDON_SYSTEM, COLLE_SYSTEM]
}

impl PatternRule {
    /// Check the rule against a game's canonical tokens (both colours).
    pub fn detect<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        let white: Vec<&str> = tokens
            .iter()
            .take(self.window)
            .step_by(2)
            .map(|t| t.as_ref())
            .collect();

        let Some(diag_idx) = white.iter().position(|t| *t == self.diagnostic) else {
            return false;
        };

        if white[..diag_idx].iter().any(|t| self.disqualifiers.contains(t)) {
            return false;
        }

        if !self.required.iter().all(|r| white.contains(r)) {
            return false;
        }

        self.supporting.is_empty()
            || white
                .iter()
                .enumerate()
                .any(|(i, t)| self.supporting.contains(t) && (i < diag_idx || i < self.early_moves))
    }

    /// Whether a catalogue name fragment mentions this system.
    pub fn names(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.label.to_lowercase())
    }
}

/// First rule in table order that the game satisfies.
pub fn detect_pattern<'r>(rules: &'r [PatternRule], game: &ReplayedGame) -> Option<&'r PatternRule> {
    rules.iter().find(|rule| rule.detect(game.tokens()))
}

/// Catalogue entry naming `rule` anywhere in its name (family or variation)
/// that shares a position with the game, preferring the lowest played ply; among entries at that ply the most
/// specific name wins, then catalogue order.
pub fn find_catalogue_match<'c>(
    catalogue: &'c Catalogue,
    rule: &PatternRule,
    game: &ReplayedGame,
) -> Option<(&'c OpeningEntry, usize)> {
    for record in game.plies() {
        let mut best: Option<&OpeningEntry> = None;
        for hit in catalogue.hits(&record.canonical_key) {
            let Some(entry) = catalogue.entry(hit.entry) else {
                continue;
            };
            if !rule.names(&entry.name) {
                continue;
            }
            let better = best.map_or(true, |b| specificity(&entry.name) > specificity(&b.name));
            if better {
                best = Some(entry);
            }
        }
        if let Some(entry) = best {
            return Some((entry, record.ply));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::CatalogueRecord;
    use chess_core::{pgn::split_tokens, replay_text};

    #[test]
    fn test_london_detected_in_any_order() {
        assert!(LONDON_SYSTEM.detect(&split_tokens("1. d4 d5 2. Bf4 Nf6 3. e3 e6")));
        assert!(LONDON_SYSTEM.detect(&split_tokens("1. d4 Nf6 2. Nf3 e6 3. e3 b6 4. Bf4")));
        assert!(LONDON_SYSTEM.detect(&split_tokens("1. Nf3 d5 2. d4 Nf6 3. Bf4 c5 4. c3")));
    }

    #[test]
    fn test_london_disqualified_by_early_c4() {
        assert!(!LONDON_SYSTEM.detect(&split_tokens("1. d4 Nf6 2. c4 e6 3. Nc3 d5 4. Bf4")));
    }

    #[test]
    fn test_london_needs_support_and_d4() {
        // no e3/c3 at all
        assert!(!LONDON_SYSTEM.detect(&split_tokens("1. d4 d5 2. Bf4 Nf6 3. Nf3 e6 4. Nbd2 c5")));
        // no d4
        assert!(!LONDON_SYSTEM.detect(&split_tokens("1. e3 e5 2. Bf4")));
        // support only after the window's early moves and after Bf4
        assert!(!LONDON_SYSTEM.detect(&split_tokens(
            "1. d4 d5 2. Bf4 Nf6 3. Nf3 e6 4. Nbd2 c5 5. h3 Nc6 6. e3"
        )));
    }

    #[test]
    fn test_london_only_counts_white_moves() {
        // Black's ...Bf4 does not count
        assert!(!LONDON_SYSTEM.detect(&split_tokens("1. e3 e5 2. d4 exd4 3. exd4 Bd6 4. Nf3 Bf4")));
    }

    #[test]
    fn test_window_limits_detection() {
        let late = "1. d4 d5 2. e3 e6 3. Nf3 Nf6 4. h3 c5 5. a3 Nc6 6. b3 Be7 7. Bb2 O-O 8. Nbd2 b6 9. Bf4";
        assert!(!LONDON_SYSTEM.detect(&split_tokens(late)));
    }

    #[test]
    fn test_colle_detected() {
        assert!(COLLE_SYSTEM.detect(&split_tokens("1. d4 d5 2. Nf3 Nf6 3. e3 e6 4. Bd3 c5 5. c3")));
        assert!(!COLLE_SYSTEM.detect(&split_tokens("1. d4 d5 2. Bf4 Nf6 3. e3 e6 4. Bd3")));
    }

    #[test]
    fn test_find_catalogue_match_uses_shared_position() {
        let catalogue = Catalogue::from_records(vec![
            CatalogueRecord::new(Some("D02"), "Queen's Pawn Game: London System", "1. d4 d5 2. Nf3 Nf6 3. Bf4"),
            CatalogueRecord::new(Some("A48"), "London System", "1. Nf3 d5 2. d4 Nf6 3. Bf4"),
            CatalogueRecord::new(Some("D00"), "Queen's Pawn Game", "1. d4 d5"),
        ]);
        let game = replay_text("1. d4 d5 2. Nf3 Nf6 3. Bf4 e6 4. e3", None);

        // the variation row names the system and shares the position after 1. d4
        let (entry, ply) = find_catalogue_match(&catalogue, &LONDON_SYSTEM, &game).unwrap();
        assert_eq!(entry.name, "Queen's Pawn Game: London System");
        assert_eq!(ply, 1);
    }

    #[test]
    fn test_find_catalogue_match_ignores_unrelated_names() {
        let catalogue = Catalogue::from_records(vec![
            CatalogueRecord::new(Some("A45"), "Indian Defense", "1. d4 Nf6"),
            CatalogueRecord::new(Some("A48"), "London System", "1. Nf3 d5 2. d4 Nf6 3. Bf4"),
        ]);
        let game = replay_text("1. d4 Nf6 2. Bf4 e6 3. e3", None);
        assert!(find_catalogue_match(&catalogue, &LONDON_SYSTEM, &game).is_none());

        let transposed = replay_text("1. d4 d5 2. Nf3 Nf6 3. Bf4 e6 4. e3", None);
        let (entry, ply) = find_catalogue_match(&catalogue, &LONDON_SYSTEM, &transposed).unwrap();
        assert_eq!(entry.name, "London System");
        assert_eq!(ply, 3);
    }

    #[test]
    fn test_detect_pattern_table_order() {
        let game = replay_text("1. d4 d5 2. Bf4 Nf6 3. e3 e6", None);
        let rules = default_patterns();
        assert_eq!(detect_pattern(&rules, &game).map(|r| r.label), Some("London System"));
        assert_eq!(detect_pattern(&[COLLE_SYSTEM], &game), None);
    }
}
