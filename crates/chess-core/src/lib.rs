pub mod pgn;
pub mod replay;

pub use replay::{canonical_key, canonicalize_fen, normalize_fen, replay_text, replay_tokens, PlyRecord, ReplayedGame};
