//! Move replay: turns move tokens into ply records keyed by canonical position.
//!
//! The same replay runs for catalogue entries and for played games, so their
//! canonical keys are directly comparable.

use serde::Serialize;
use shakmaty::{
    fen::Fen, san::San, uci::UciMove, CastlingMode, Chess, EnPassantMode, Move, Position,
};

use crate::pgn;

/// One successfully replayed half-move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlyRecord {
    /// 1-based half-move number.
    pub ply: usize,
    /// Canonical SAN of the move actually played (no check suffix).
    pub token: String,
    /// Token as it appeared in the input.
    pub raw: String,
    pub canonical_key: String,
}

/// Result of replaying a move list. Append-only while replaying; stops at the
/// ply limit or at the first token that is neither valid SAN nor a legal
/// coordinate move.
#[derive(Debug, Clone, Default)]
pub struct ReplayedGame {
    plies: Vec<PlyRecord>,
    tokens: Vec<String>,
    input_tokens: usize,
    limited: bool,
}

impl ReplayedGame {
    pub fn plies(&self) -> &[PlyRecord] {
        &self.plies
    }

    pub fn len(&self) -> usize {
        self.plies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plies.is_empty()
    }

    /// Canonical tokens of every replayed ply, in order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Played tokens from ply 1 through `ply` (clamped to what replayed).
    pub fn prefix(&self, ply: usize) -> &[String] {
        &self.tokens[..ply.min(self.tokens.len())]
    }

    pub fn ply(&self, ply: usize) -> Option<&PlyRecord> {
        ply.checked_sub(1).and_then(|i| self.plies.get(i))
    }

    /// Number of move-token candidates found in the input, replayed or not.
    pub fn input_tokens(&self) -> usize {
        self.input_tokens
    }

    /// True when the ply limit stopped replay with input tokens left over.
    pub fn stopped_at_limit(&self) -> bool {
        self.limited
    }

    /// True when an unplayable token stopped replay early.
    pub fn is_truncated(&self) -> bool {
        !self.limited && self.plies.len() < self.input_tokens
    }

    /// Canonical keys indexed by ply (index 0 is ply 1).
    pub fn keys(&self) -> Vec<&str> {
        self.plies.iter().map(|p| p.canonical_key.as_str()).collect()
    }
}

/// Replay movetext from the standard starting position.
pub fn replay_text(text: &str, limit: Option<usize>) -> ReplayedGame {
    replay_tokens(&pgn::split_tokens(text), limit)
}

/// Replay already-split tokens from the standard starting position.
/// At most `limit` plies are replayed when a limit is given.
pub fn replay_tokens<S: AsRef<str>>(tokens: &[S], limit: Option<usize>) -> ReplayedGame {
    let max_plies = limit.unwrap_or(usize::MAX);
    let mut pos = Chess::default();
    let mut game = ReplayedGame {
        plies: Vec::new(),
        tokens: Vec::new(),
        input_tokens: tokens.len(),
        limited: false,
    };

    for raw in tokens.iter().map(|t| t.as_ref()) {
        if game.plies.len() >= max_plies {
            game.limited = true;
            break;
        }

        let token = pgn::normalize_token(raw);
        let Some(mv) = parse_move(&pos, &token) else {
            tracing::debug!(ply = game.plies.len() + 1, token = %raw, "Replay stopped at unplayable move");
            break;
        };

        let san = San::from_move(&pos, mv.clone()).to_string();
        pos.play_unchecked(mv);

        game.plies.push(PlyRecord {
            ply: game.plies.len() + 1,
            token: san.clone(),
            raw: raw.to_string(),
            canonical_key: canonical_key(&pos),
        });
        game.tokens.push(san);
    }

    game
}

/// Resolve a token to a legal move: strict SAN, then lenient SAN, then
/// coordinate notation.
pub fn parse_move(pos: &Chess, token: &str) -> Option<Move> {
    if let Ok(san) = token.parse::<San>() {
        if let Ok(mv) = san.to_move(pos) {
            return Some(mv);
        }
        if let Some(mv) = lenient_san_move(pos, &san) {
            return Some(mv);
        }
    }

    let uci: UciMove = token.parse().ok()?;
    uci.to_move(pos).ok()
}

/// Accept SAN whose capture mark or disambiguation is not strictly right,
/// as long as exactly one legal move fits.
fn lenient_san_move(pos: &Chess, san: &San) -> Option<Move> {
    let San::Normal { role, file, rank, to, promotion, .. } = san else {
        return None;
    };

    let mut candidates = pos.legal_moves().into_iter().filter(|m| {
        m.role() == *role
            && m.to() == *to
            && m.promotion() == *promotion
            && m.from().is_some_and(|from| {
                file.map_or(true, |f| from.file() == f) && rank.map_or(true, |r| from.rank() == r)
            })
    });

    let found = candidates.next()?;
    if candidates.next().is_some() {
        return None;
    }
    Some(found)
}

/// Position identity without move counters: placement, side to move,
/// castling rights and (legal-only) en-passant square.
pub fn canonical_key(pos: &Chess) -> String {
    let fen = Fen::from_position(pos, EnPassantMode::Legal).to_string();
    normalize_fen(&fen)
}

/// Canonicalize a declared FEN/EPD string the same way replayed positions are.
/// Strings that do not parse as a standard position keep their first four fields.
pub fn canonicalize_fen(fen: &str) -> String {
    let parsed = Fen::from_ascii(fen.trim().as_bytes())
        .ok()
        .and_then(|f| f.into_position::<Chess>(CastlingMode::Standard).ok());

    match parsed {
        Some(pos) => canonical_key(&pos),
        None => normalize_fen(fen),
    }
}

/// Strips move counters from FEN, keeping only position + side + castling + ep.
pub fn normalize_fen(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq -";

    #[test]
    fn test_normalize_fen() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        assert_eq!(normalize_fen(fen), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3");
    }

    #[test]
    fn test_canonical_key_drops_illegal_ep_and_counters() {
        let game = replay_text("1. e4", None);
        assert_eq!(game.len(), 1);
        assert_eq!(game.plies()[0].canonical_key, AFTER_E4);
        assert_eq!(canonicalize_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"), AFTER_E4);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let a = replay_text("1. d4 Nf6 2. c4 e6 3. Nc3 Bb4", None);
        let b = replay_tokens(&["d4", "Nf6", "c4", "e6", "Nc3", "Bb4"], None);
        assert_eq!(a.keys(), b.keys());
        assert_eq!(a.tokens(), b.tokens());
    }

    #[test]
    fn test_transposition_reaches_same_key() {
        let a = replay_text("1. Nf3 d5 2. d4", None);
        let b = replay_text("1. d4 d5 2. Nf3", None);
        assert_eq!(a.plies()[2].canonical_key, b.plies()[2].canonical_key);
        assert_ne!(a.tokens(), b.tokens());
    }

    #[test]
    fn test_replay_stops_at_illegal_move() {
        let game = replay_text("1. e4 e5 2. Ke3 Nc6", None);
        assert_eq!(game.len(), 2);
        assert_eq!(game.input_tokens(), 4);
        assert!(game.is_truncated());
    }

    #[test]
    fn test_coordinate_fallback_yields_san_tokens() {
        let game = replay_text("e2e4 e7e5 g1f3 b8c6 f1b5", None);
        assert_eq!(game.tokens(), ["e4", "e5", "Nf3", "Nc6", "Bb5"]);
        assert_eq!(game.plies()[2].raw, "g1f3");
    }

    #[test]
    fn test_lenient_capture_mark() {
        // capture mark on a quiet move, plus a needless disambiguation
        let game = replay_text("1. e4 d5 2. exd5 Ngxf6", None);
        assert_eq!(game.tokens(), ["e4", "d5", "exd5", "Nf6"]);
    }

    #[test]
    fn test_ply_limit() {
        let game = replay_text("1. e4 e5 2. Nf3 Nc6 3. Bb5", Some(3));
        assert_eq!(game.len(), 3);
        assert_eq!(game.prefix(10).len(), 3);
        assert_eq!(game.prefix(2), ["e4", "e5"]);
        assert_eq!(game.input_tokens(), 5);
        assert!(game.stopped_at_limit());
        assert!(!game.is_truncated());
    }

    #[test]
    fn test_ply_limit_not_reached() {
        let game = replay_text("1. e4 e5 2. Nf3", Some(3));
        assert_eq!(game.len(), 3);
        assert_eq!(game.input_tokens(), 3);
        assert!(!game.stopped_at_limit());
    }

    #[test]
    fn test_unplayable_move_before_limit() {
        let game = replay_text("1. e4 e5 2. Ke3 Nc6 3. Bb5", Some(4));
        assert_eq!(game.len(), 2);
        assert_eq!(game.input_tokens(), 5);
        assert!(game.is_truncated());
        assert!(!game.stopped_at_limit());
    }

    #[test]
    fn test_castling_in_both_notations() {
        let san = replay_text("1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. 0-0", None);
        let uci = replay_text("e2e4 e7e5 g1f3 b8c6 f1c4 f8c5 e1g1", None);
        assert_eq!(san.tokens().last().map(String::as_str), Some("O-O"));
        assert_eq!(san.keys(), uci.keys());
    }

    #[test]
    fn test_empty_input() {
        let game = replay_text("1/2-1/2", None);
        assert!(game.is_empty());
        assert_eq!(game.input_tokens(), 0);
        assert_eq!(game.ply(1), None);
    }
}
