//! Opening catalogue: loads reference openings once and indexes every
//! canonical position their move lists pass through.
//!
//! The catalogue is built at startup and is read-only afterwards; queries
//! share it by reference.

use chess_core::{canonicalize_fen, pgn, replay_tokens};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::CatalogueError;

/// One record as it appears in a catalogue source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogueRecord {
    pub name: String,
    #[serde(default, alias = "pgn", alias = "uci")]
    pub moves: String,
    #[serde(default)]
    pub eco: Option<String>,
    #[serde(default, alias = "epd")]
    pub fen: Option<String>,
}

impl CatalogueRecord {
    pub fn new(eco: Option<&str>, name: &str, moves: &str) -> Self {
        Self {
            name: name.to_string(),
            moves: moves.to_string(),
            eco: eco.map(str::to_string),
            fen: None,
        }
    }
}

/// A normalized catalogue entry. Immutable once built.
#[derive(Debug, Clone)]
pub struct OpeningEntry {
    pub id: usize,
    pub name: String,
    pub eco: Option<String>,
    /// Normalized move list: single-spaced tokens, no move numbers.
    pub moves: String,
    pub tokens: Vec<String>,
    /// False when the move list was empty or failed to replay in full.
    pub replayed: bool,
    ply_by_key: HashMap<String, usize>,
    declared_key: Option<String>,
}

impl OpeningEntry {
    pub fn from_record(id: usize, record: CatalogueRecord) -> Self {
        let raw_tokens = pgn::split_tokens(&record.moves);
        let mut ply_by_key = HashMap::new();
        let mut tokens = raw_tokens.clone();
        let mut replayed = false;

        if !raw_tokens.is_empty() {
            let game = replay_tokens(&raw_tokens, None);
            if game.len() == raw_tokens.len() {
                for ply in game.plies() {
                    ply_by_key.entry(ply.canonical_key.clone()).or_insert(ply.ply);
                }
                tokens = game.tokens().to_vec();
                replayed = true;
            } else {
                tracing::debug!(
                    name = %record.name,
                    replayed = game.len(),
                    total = raw_tokens.len(),
                    "Catalogue entry moves do not replay; keeping it unindexed"
                );
            }
        }

        let declared_key = record
            .fen
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(canonicalize_fen);

        Self {
            id,
            name: record.name.trim().to_string(),
            eco: record.eco.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
            moves: tokens.join(" "),
            tokens,
            replayed,
            ply_by_key,
            declared_key,
        }
    }

    /// Ply within this entry at which `key` is first reached.
    pub fn ply_of(&self, key: &str) -> Option<usize> {
        self.ply_by_key.get(key).copied()
    }

    pub fn reaches(&self, key: &str) -> bool {
        self.ply_by_key.contains_key(key)
    }

    pub fn declared_key(&self) -> Option<&str> {
        self.declared_key.as_deref()
    }

    pub fn move_count(&self) -> usize {
        self.tokens.len()
    }

    /// Broad family name: the text before the first colon.
    pub fn family(&self) -> &str {
        self.name.split(':').next().unwrap_or("").trim()
    }
}

/// An index slot: which entry reaches a key, and at which of its own plies.
/// `ply` is `None` when the key is the entry's declared position only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHit {
    pub entry: usize,
    pub ply: Option<usize>,
}

/// The catalogue plus its reverse index: canonical key -> entries.
#[derive(Debug, Default)]
pub struct Catalogue {
    entries: Vec<OpeningEntry>,
    index: HashMap<String, Vec<IndexHit>>,
}

impl Catalogue {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build and index a catalogue. Records without a name are dropped;
    /// records with unusable moves are kept but not indexed.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CatalogueRecord>,
    {
        let mut entries = Vec::new();
        for record in records {
            if record.name.trim().is_empty() {
                tracing::debug!(moves = %record.moves, "Skipping catalogue record without a name");
                continue;
            }
            entries.push(OpeningEntry::from_record(entries.len(), record));
        }

        let mut index: HashMap<String, Vec<IndexHit>> = HashMap::new();
        for entry in &entries {
            if let Some(key) = entry.declared_key() {
                if !entry.reaches(key) {
                    index
                        .entry(key.to_string())
                        .or_default()
                        .push(IndexHit { entry: entry.id, ply: None });
                }
            }
            for (key, ply) in &entry.ply_by_key {
                index
                    .entry(key.clone())
                    .or_default()
                    .push(IndexHit { entry: entry.id, ply: Some(*ply) });
            }
        }

        Self { entries, index }
    }

    /// Load a catalogue file (`.tsv` or `.json`) or a directory of them.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogueError> {
        let path = path.as_ref();

        let records = if path.is_dir() {
            let mut files = Vec::new();
            for ext in ["tsv", "json"] {
                let pattern = format!("{}/*.{ext}", path.display());
                files.extend(glob::glob(&pattern)?.filter_map(Result::ok));
            }
            if files.is_empty() {
                return Err(CatalogueError::NoSources(path.display().to_string()));
            }
            files.sort();

            let mut records = Vec::new();
            for file in &files {
                records.extend(read_records(file)?);
            }
            records
        } else {
            read_records(path)?
        };

        Ok(Self::from_records(records))
    }

    /// Load a catalogue, degrading to an empty one when the source is
    /// missing or malformed.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(catalogue) => {
                tracing::info!(
                    "Loaded opening catalogue: {} entries, {} positions",
                    catalogue.len(),
                    catalogue.position_count()
                );
                catalogue
            }
            Err(e) => {
                tracing::warn!("Failed to load opening catalogue from {}: {}", path.display(), e);
                tracing::warn!("Classification will report no match");
                Self::empty()
            }
        }
    }

    pub fn entries(&self) -> &[OpeningEntry] {
        &self.entries
    }

    pub fn entry(&self, id: usize) -> Option<&OpeningEntry> {
        self.entries.get(id)
    }

    /// Index hits for a canonical key, in catalogue order.
    pub fn hits(&self, key: &str) -> &[IndexHit] {
        self.index.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct canonical positions indexed.
    pub fn position_count(&self) -> usize {
        self.index.len()
    }
}

fn read_records(path: &Path) -> Result<Vec<CatalogueRecord>, CatalogueError> {
    let text = fs::read_to_string(path).map_err(|source| CatalogueError::Io {
        path: path.display().to_string(),
        source,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => parse_json(&text),
        _ => Ok(parse_tsv(&text)),
    }
}

/// Parse a JSON array of catalogue records.
pub fn parse_json(text: &str) -> Result<Vec<CatalogueRecord>, CatalogueError> {
    Ok(serde_json::from_str(text)?)
}

/// Column positions within a TSV catalogue.
struct TsvLayout {
    eco: Option<usize>,
    name: usize,
    moves: usize,
    fen: Option<usize>,
}

impl Default for TsvLayout {
    fn default() -> Self {
        Self {
            eco: Some(0),
            name: 1,
            moves: 2,
            fen: Some(3),
        }
    }
}

impl TsvLayout {
    fn from_header(cells: &[&str]) -> Self {
        let find = |names: &[&str]| {
            cells
                .iter()
                .position(|c| names.iter().any(|n| c.trim().eq_ignore_ascii_case(n)))
        };
        let defaults = Self::default();

        Self {
            eco: find(&["eco"]),
            name: find(&["name"]).unwrap_or(defaults.name),
            moves: find(&["pgn", "moves"]).or_else(|| find(&["uci"])).unwrap_or(defaults.moves),
            fen: find(&["epd", "fen"]),
        }
    }
}

/// Parse `eco<TAB>name<TAB>pgn[<TAB>epd]` rows. A header row, when present,
/// decides the column layout. Short rows are skipped.
pub fn parse_tsv(text: &str) -> Vec<CatalogueRecord> {
    let mut layout = TsvLayout::default();
    let mut records = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let cells: Vec<&str> = line.split('\t').collect();
        if line_no == 0 && cells.first().is_some_and(|c| c.trim().eq_ignore_ascii_case("eco")) {
            layout = TsvLayout::from_header(&cells);
            continue;
        }

        let cell = |i: usize| cells.get(i).map(|c| c.trim()).filter(|c| !c.is_empty());
        let (Some(name), Some(moves)) = (cell(layout.name), cell(layout.moves)) else {
            tracing::debug!(line = line_no + 1, "Skipping malformed catalogue row");
            continue;
        };

        records.push(CatalogueRecord {
            name: name.to_string(),
            moves: moves.to_string(),
            eco: layout.eco.and_then(cell).map(str::to_string),
            fen: layout.fen.and_then(cell).map(str::to_string),
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::replay_text;

    fn ruy_lopez() -> CatalogueRecord {
        CatalogueRecord::new(Some("C60"), "Ruy Lopez", "1. e4 e5 2. Nf3 Nc6 3. Bb5")
    }

    #[test]
    fn test_entry_ply_map_and_tokens() {
        let entry = OpeningEntry::from_record(0, ruy_lopez());
        assert!(entry.replayed);
        assert_eq!(entry.moves, "e4 e5 Nf3 Nc6 Bb5");
        assert_eq!(entry.move_count(), 5);

        let game = replay_text("e4 e5 Nf3", None);
        assert_eq!(entry.ply_of(&game.plies()[2].canonical_key), Some(3));
    }

    #[test]
    fn test_unreplayable_entry_is_kept_but_not_indexed() {
        let catalogue = Catalogue::from_records(vec![
            CatalogueRecord::new(Some("A00"), "Broken Line", "1. e4 e5 2. Ke3"),
            CatalogueRecord::new(None, "No Moves", ""),
            ruy_lopez(),
        ]);

        assert_eq!(catalogue.len(), 3);
        assert!(!catalogue.entries()[0].replayed);
        assert_eq!(catalogue.entries()[0].tokens, vec!["e4", "e5", "Ke3"]);

        let replay = replay_text("e4", None);
        let after_e4 = &replay.plies()[0].canonical_key;
        let hits = catalogue.hits(after_e4);
        assert_eq!(hits, &[IndexHit { entry: 2, ply: Some(1) }]);
    }

    #[test]
    fn test_declared_position_indexed_without_ply() {
        let record = CatalogueRecord {
            name: "Position Only".into(),
            moves: String::new(),
            eco: None,
            fen: Some("rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 1".into()),
        };
        let catalogue = Catalogue::from_records(vec![record]);

        let replay = replay_text("d4", None);
        let after_d4 = &replay.plies()[0].canonical_key;
        assert_eq!(catalogue.hits(after_d4), &[IndexHit { entry: 0, ply: None }]);
    }

    #[test]
    fn test_declared_position_not_indexed_twice() {
        let mut record = CatalogueRecord::new(None, "Queen's Pawn Game", "1. d4");
        record.fen = Some("rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq -".into());
        let catalogue = Catalogue::from_records(vec![record]);

        let replay = replay_text("d4", None);
        let after_d4 = &replay.plies()[0].canonical_key;
        assert_eq!(catalogue.hits(after_d4), &[IndexHit { entry: 0, ply: Some(1) }]);
    }

    #[test]
    fn test_first_reached_ply_wins() {
        // ply 5 repeats the position after ply 1
        let entry = OpeningEntry::from_record(
            0,
            CatalogueRecord::new(None, "Knight Dance", "Nf3 Nf6 Ng1 Ng8 Nf3"),
        );
        let replay = replay_text("Nf3", None);
        let after_nf3 = &replay.plies()[0].canonical_key;
        assert_eq!(entry.ply_of(after_nf3), Some(1));
    }

    #[test]
    fn test_parse_tsv_with_header() {
        let text = "eco\tname\tpgn\nC60\tRuy Lopez\t1. e4 e5 2. Nf3 Nc6 3. Bb5\nbad row\n\nB00\tKing's Pawn Game\t1. e4\n";
        let records = parse_tsv(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].eco.as_deref(), Some("C60"));
        assert_eq!(records[1].name, "King's Pawn Game");
    }

    #[test]
    fn test_parse_tsv_header_reorders_columns() {
        let text = "eco\tname\tuci\tpgn\nA45\tIndian Defense\td2d4 g8f6\t1. d4 Nf6\n";
        let records = parse_tsv(text);
        assert_eq!(records[0].moves, "1. d4 Nf6");
        assert_eq!(records[0].fen, None);
    }

    #[test]
    fn test_parse_json_aliases() {
        let json = r#"[
            {"name": "Sicilian Defense", "eco": "B20", "pgn": "1. e4 c5"},
            {"name": "Italian Game", "moves": "e4 e5 Nf3 Nc6 Bc4"}
        ]"#;
        let records = parse_json(json).unwrap();
        assert_eq!(records[0].moves, "1. e4 c5");
        assert_eq!(records[1].eco, None);
    }

    #[test]
    fn test_load_missing_file_degrades_to_empty() {
        let catalogue = Catalogue::load_or_empty("/definitely/not/a/catalogue.tsv");
        assert!(catalogue.is_empty());
        assert_eq!(catalogue.position_count(), 0);
        assert!(Catalogue::load("/definitely/not/a/catalogue.tsv").is_err());
    }

    #[test]
    fn test_load_directory() {
        let dir = std::env::temp_dir().join(format!("eco-walkup-catalogue-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.tsv"), "eco\tname\tpgn\nB00\tKing's Pawn Game\t1. e4\n").unwrap();
        fs::write(dir.join("b.json"), r#"[{"name": "Queen's Pawn Game", "pgn": "1. d4"}]"#).unwrap();

        let catalogue = Catalogue::load(&dir).unwrap();
        assert_eq!(catalogue.len(), 2);
        assert_eq!(catalogue.entries()[0].name, "King's Pawn Game");
        assert_eq!(catalogue.entries()[1].name, "Queen's Pawn Game");

        fs::remove_dir_all(&dir).unwrap();
    }
}
