use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    NoMatch,
    /// The input held no move that could be replayed.
    NoMovesParsed,
}

/// How a name was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Canonical-position lookup through the scorer.
    Position,
    /// Catalogue move list extending the played moves, position ignored.
    SequencePrefix,
    /// Named-system pattern, with or without a backing catalogue entry.
    Pattern,
    /// First-move family label for one-move games.
    FirstMove,
}

/// Classification of one ply in the progressive report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionStep {
    pub ply: usize,
    /// Numbered movetext through this ply, e.g. `1. e4 e5 2. Nf3`.
    pub sequence: String,
    pub token: String,
    pub name: Option<String>,
    pub eco: Option<String>,
    pub path: Vec<String>,
    pub canonical_key: String,
    pub source: Option<MatchSource>,
}

/// One walk-up level: the entry chosen at a ply and how its moves line up
/// with the game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelDiagnostic {
    pub ply: usize,
    pub name: String,
    pub eco: Option<String>,
    pub entry_tokens: Vec<String>,
    /// For each entry token, the index of the played move it corresponds to.
    pub played_indices: Vec<Option<usize>>,
    /// Entry moves were played, but not at the same indices.
    pub transposed: bool,
    pub candidates: usize,
    pub set_match_fraction: f64,
    pub ordering_key: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub status: MatchStatus,
    pub name: Option<String>,
    pub eco: Option<String>,
    /// ECO code from the input's PGN header, if it had one.
    pub declared_eco: Option<String>,
    /// Hierarchical path, most specific first.
    pub path: Vec<String>,
    pub matched_ply: Option<usize>,
    pub source: Option<MatchSource>,
    pub plies_replayed: usize,
    pub progression: Vec<ProgressionStep>,
    /// Named system detected from the game's set-up moves, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Vec<LevelDiagnostic>>,
}

impl AnalysisResult {
    pub(crate) fn unmatched(status: MatchStatus, plies_replayed: usize) -> Self {
        Self {
            status,
            name: None,
            eco: None,
            declared_eco: None,
            path: Vec::new(),
            matched_ply: None,
            source: None,
            plies_replayed,
            progression: Vec::new(),
            pattern: None,
            diagnostics: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.status == MatchStatus::Matched
    }
}
