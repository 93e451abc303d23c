//! Whole-game classification.
//!
//! Replays the game, scores every ply once against the catalogue, anchors on
//! the deepest ply with a positional match and walks back up to ply 1 to
//! assemble the hierarchical path. Named-system patterns refine a walk-up
//! path that does not mention the system. Games with no positional match fall
//! back to move-sequence matching and named-system patterns.

use chess_core::{pgn, replay_text, ReplayedGame};
use tracing::debug;

use crate::catalogue::Catalogue;
use crate::first_moves::FirstMoveTable;
use crate::options::ClassifyOptions;
use crate::path::{append_first_move, build_path, merge_paths};
use crate::pattern::{default_patterns, detect_pattern, find_catalogue_match, PatternRule};
use crate::result::{AnalysisResult, LevelDiagnostic, MatchSource, MatchStatus, ProgressionStep};
use crate::scorer::{self, best_sequence_entry, MatchCandidate, MatchQuery, TokenBag};

/// Scorer output for one ply.
struct ScoredPly<'c> {
    best: Option<MatchCandidate<'c>>,
    candidates: usize,
}

/// The classifier: an indexed catalogue plus the first-move and pattern
/// tables. Built once and shared read-only by every query.
#[derive(Debug)]
pub struct OpeningEngine {
    catalogue: Catalogue,
    first_moves: FirstMoveTable,
    patterns: Vec<PatternRule>,
}

impl OpeningEngine {
    pub fn new(catalogue: Catalogue) -> Self {
        Self {
            catalogue,
            first_moves: FirstMoveTable::default(),
            patterns: default_patterns(),
        }
    }

    pub fn with_first_moves(mut self, first_moves: FirstMoveTable) -> Self {
        self.first_moves = first_moves;
        self
    }

    pub fn with_patterns(mut self, patterns: Vec<PatternRule>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Classify a move list. At most `ply_limit` plies are replayed.
    ///
    /// Never fails: unparseable input, truncated games and unknown openings
    /// all come back as a result with the matching `status`.
    pub fn classify(&self, moves: &str, ply_limit: Option<usize>, options: &ClassifyOptions) -> AnalysisResult {
        let game = replay_text(moves, ply_limit);
        let declared_eco = pgn::extract_header(moves, "ECO");

        if game.is_empty() {
            debug!(input_tokens = game.input_tokens(), "No moves parsed");
            let mut result = AnalysisResult::unmatched(MatchStatus::NoMovesParsed, 0);
            result.declared_eco = declared_eco;
            return result;
        }

        let bag = TokenBag::from_tokens(game.tokens());
        let first = game.tokens().first().map(String::as_str);

        let scored: Vec<ScoredPly<'_>> = (1..=game.len())
            .map(|ply| self.score_ply(&game, ply, &bag, options))
            .collect();

        let progression = self.progression(&game, &scored, options.report_limit(), first);

        let mut result = match scored.iter().rposition(|s| s.best.is_some()) {
            Some(idx) => {
                let mut result = self.walk_up(&game, &scored, idx + 1, first, options);
                if !options.require_exact_position_match {
                    self.augment_with_pattern(&game, &mut result, first);
                }
                result
            }
            None if options.require_exact_position_match => {
                AnalysisResult::unmatched(MatchStatus::NoMatch, game.len())
            }
            None => self.fallback(&game, first),
        };

        result.progression = progression;
        result.declared_eco = declared_eco;
        result.plies_replayed = game.len();

        debug!(
            plies = game.len(),
            truncated = game.is_truncated(),
            limited = game.stopped_at_limit(),
            status = ?result.status,
            name = ?result.name,
            "Classified game"
        );

        result
    }

    fn score_ply<'c>(
        &'c self,
        game: &ReplayedGame,
        ply: usize,
        bag: &TokenBag,
        options: &ClassifyOptions,
    ) -> ScoredPly<'c> {
        let record = &game.plies()[ply - 1];
        let query = MatchQuery {
            key: &record.canonical_key,
            ply,
            prefix: game.prefix(ply),
            game: bag,
            orderless: options.orderless_matching,
            threshold: options.threshold(),
            order: options.score_order(),
        };

        let all = scorer::candidates(&self.catalogue, &query);
        let candidates = all.len();
        ScoredPly {
            best: scorer::pick_best(all),
            candidates,
        }
    }

    /// Independent classification of each ply up to `limit`.
    fn progression(
        &self,
        game: &ReplayedGame,
        scored: &[ScoredPly<'_>],
        limit: usize,
        first: Option<&str>,
    ) -> Vec<ProgressionStep> {
        game.plies()
            .iter()
            .zip(scored)
            .take(limit)
            .map(|(record, scored)| {
                let prefix = game.prefix(record.ply);

                let (name, eco, source) = if let Some(best) = &scored.best {
                    (Some(best.entry.name.clone()), best.entry.eco.clone(), Some(MatchSource::Position))
                } else if let Some(entry) = best_sequence_entry(&self.catalogue, prefix) {
                    (Some(entry.name.clone()), entry.eco.clone(), Some(MatchSource::SequencePrefix))
                } else if let Some(label) = self.one_move_label(game, first) {
                    (Some(label.to_string()), None, Some(MatchSource::FirstMove))
                } else {
                    (None, None, None)
                };

                let path = name
                    .as_deref()
                    .map(|n| build_path(n, first, &self.first_moves))
                    .unwrap_or_default();

                ProgressionStep {
                    ply: record.ply,
                    sequence: pgn::format_movetext(prefix),
                    token: record.token.clone(),
                    name,
                    eco,
                    path,
                    canonical_key: record.canonical_key.clone(),
                    source,
                }
            })
            .collect()
    }

    /// Walk from the anchor ply back to ply 1, collecting each ply's best
    /// entry name (first occurrence kept) and merging their paths.
    fn walk_up(
        &self,
        game: &ReplayedGame,
        scored: &[ScoredPly<'_>],
        anchor: usize,
        first: Option<&str>,
        options: &ClassifyOptions,
    ) -> AnalysisResult {
        let Some(anchor_best) = scored[anchor - 1].best.as_ref() else {
            return AnalysisResult::unmatched(MatchStatus::NoMatch, game.len());
        };

        let mut names: Vec<&str> = Vec::new();
        let mut eco = anchor_best.entry.eco.clone();
        let mut levels = Vec::new();

        for ply in (1..=anchor).rev() {
            let level = &scored[ply - 1];
            let Some(best) = &level.best else {
                continue;
            };

            if !names.contains(&best.raw_name) {
                names.push(best.raw_name);
            }
            if eco.is_none() {
                eco = best.entry.eco.clone();
            }
            if options.include_diagnostics {
                levels.push(diagnose(ply, best, level.candidates, game.tokens()));
            }
        }

        let mut path = merge_paths(names.iter().map(|n| build_path(n, None, &self.first_moves)));
        append_first_move(&mut path, first, &self.first_moves);

        AnalysisResult {
            status: MatchStatus::Matched,
            name: Some(anchor_best.raw_name.to_string()),
            eco,
            declared_eco: None,
            path,
            matched_ply: Some(anchor),
            source: Some(MatchSource::Position),
            plies_replayed: game.len(),
            progression: Vec::new(),
            pattern: None,
            diagnostics: options.include_diagnostics.then_some(levels),
        }
    }

    /// A walk-up path that never names a detected system is under-specified:
    /// lead it with the catalogue entry naming the system, or with the bare
    /// label. Name, code and matched ply stay those of the anchor.
    fn augment_with_pattern(&self, game: &ReplayedGame, result: &mut AnalysisResult, first: Option<&str>) {
        let Some(rule) = detect_pattern(&self.patterns, game) else {
            return;
        };
        result.pattern = Some(rule.label.to_string());

        if result.path.iter().any(|f| rule.names(f)) {
            return;
        }

        let lead = match find_catalogue_match(&self.catalogue, rule, game) {
            Some((entry, ply)) => {
                debug!(pattern = rule.label, entry = %entry.name, ply, "Pattern refines walk-up path");
                build_path(&entry.name, None, &self.first_moves)
            }
            None => {
                debug!(pattern = rule.label, "Pattern label prepended to walk-up path");
                vec![rule.label.to_string()]
            }
        };

        let family_labels = first.map(|mv| self.first_moves.labels(mv)).unwrap_or(&[]);
        let mut path = merge_paths([lead, std::mem::take(&mut result.path)]);
        path.retain(|f| !family_labels.contains(f));
        append_first_move(&mut path, first, &self.first_moves);
        result.path = path;
    }

    /// No positional match anywhere: longest played prefix that some entry
    /// extends, refined by named-system patterns.
    fn fallback(&self, game: &ReplayedGame, first: Option<&str>) -> AnalysisResult {
        let sequence = (1..=game.len())
            .rev()
            .find_map(|n| best_sequence_entry(&self.catalogue, game.prefix(n)).map(|e| (e, n)));

        let base_path = sequence
            .map(|(entry, _)| build_path(&entry.name, None, &self.first_moves))
            .unwrap_or_default();

        let matched = |name: String, eco: Option<String>, mut path: Vec<String>, ply: Option<usize>, source| {
            append_first_move(&mut path, first, &self.first_moves);
            AnalysisResult {
                status: MatchStatus::Matched,
                name: Some(name),
                eco,
                declared_eco: None,
                path,
                matched_ply: ply,
                source: Some(source),
                plies_replayed: game.len(),
                progression: Vec::new(),
                pattern: None,
                diagnostics: None,
            }
        };

        if let Some(rule) = detect_pattern(&self.patterns, game) {
            if let Some((entry, ply)) = find_catalogue_match(&self.catalogue, rule, game) {
                debug!(pattern = rule.label, entry = %entry.name, ply, "Pattern matched catalogue entry");
                let path = merge_paths([build_path(&entry.name, None, &self.first_moves), base_path]);
                let mut result = matched(entry.name.clone(), entry.eco.clone(), path, Some(ply), MatchSource::Pattern);
                result.pattern = Some(rule.label.to_string());
                return result;
            }

            debug!(pattern = rule.label, "Pattern detected without catalogue entry");
            let mut path = vec![rule.label.to_string()];
            path.extend(base_path.into_iter().filter(|f| f.as_str() != rule.label));
            let (eco, ply) = match sequence {
                Some((entry, n)) => (entry.eco.clone(), Some(n)),
                None => (None, None),
            };
            let mut result = matched(rule.label.to_string(), eco, path, ply, MatchSource::Pattern);
            result.pattern = Some(rule.label.to_string());
            return result;
        }

        if let Some((entry, n)) = sequence {
            return matched(entry.name.clone(), entry.eco.clone(), base_path, Some(n), MatchSource::SequencePrefix);
        }

        if let Some(label) = self.one_move_label(game, first) {
            return matched(label.to_string(), None, vec![label.to_string()], Some(1), MatchSource::FirstMove);
        }

        AnalysisResult::unmatched(MatchStatus::NoMatch, game.len())
    }

    /// The first-move label, only for games of exactly one ply.
    fn one_move_label(&self, game: &ReplayedGame, first: Option<&str>) -> Option<&str> {
        if game.len() != 1 {
            return None;
        }
        first.and_then(|mv| self.first_moves.primary(mv))
    }
}

fn diagnose(ply: usize, best: &MatchCandidate<'_>, candidates: usize, played: &[String]) -> LevelDiagnostic {
    let played_indices = played_indices(best.entry_tokens, played);
    let transposed = played_indices
        .iter()
        .enumerate()
        .any(|(i, idx)| matches!(idx, Some(j) if *j != i));

    LevelDiagnostic {
        ply,
        name: best.raw_name.to_string(),
        eco: best.entry.eco.clone(),
        entry_tokens: best.entry_tokens.to_vec(),
        played_indices,
        transposed,
        candidates,
        set_match_fraction: best.set_match_fraction,
        ordering_key: best.ordering_key.clone(),
    }
}

/// Map each entry token to the first unused played index holding the same move.
fn played_indices(entry_tokens: &[String], played: &[String]) -> Vec<Option<usize>> {
    let mut used = vec![false; played.len()];
    entry_tokens
        .iter()
        .map(|token| {
            let idx = (0..played.len()).find(|&j| !used[j] && played[j] == *token)?;
            used[idx] = true;
            Some(idx)
        })
        .collect()
}
