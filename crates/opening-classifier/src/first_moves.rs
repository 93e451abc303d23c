//! Broad family labels for White's first move, used as the most general
//! path fragment and as the last-resort name for one-move games.

/// Standard labels keyed by canonical SAN. The first label is the one reported.
const DEFAULT_FIRST_MOVES: &[(&str, &[&str])] = &[
    ("e4", &["King's Pawn Game", "King's Pawn Opening"]),
    ("d4", &["Queen's Pawn Game", "Queen's Pawn Opening"]),
    ("c4", &["English Opening"]),
    ("Nf3", &["Zukertort Opening", "Reti Opening"]),
    ("f4", &["Bird Opening"]),
    ("g3", &["Hungarian Opening"]),
    ("b3", &["Nimzo-Larsen Attack"]),
    ("e3", &["Van't Kruijs Opening"]),
    ("d3", &["Mieses Opening"]),
    ("c3", &["Saragossa Opening"]),
    ("Nc3", &["Van Geet Opening"]),
    ("b4", &["Polish Opening"]),
    ("g4", &["Grob Opening"]),
    ("a3", &["Anderssen's Opening"]),
    ("h3", &["Clemenz Opening"]),
    ("a4", &["Ware Opening"]),
    ("h4", &["Kadas Opening"]),
    ("f3", &["Barnes Opening"]),
    ("Nh3", &["Amar Opening"]),
    ("Na3", &["Durkin Opening"]),
];

/// Lookup table from a first move to its family labels.
#[derive(Debug, Clone)]
pub struct FirstMoveTable {
    rows: Vec<(String, Vec<String>)>,
}

impl FirstMoveTable {
    pub fn new<I, M, L>(rows: I) -> Self
    where
        I: IntoIterator<Item = (M, Vec<L>)>,
        M: Into<String>,
        L: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|(mv, labels)| (mv.into(), labels.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    /// All labels for a first move, primary label first.
    pub fn labels(&self, first_move: &str) -> &[String] {
        self.rows
            .iter()
            .find(|(mv, _)| mv == first_move)
            .map(|(_, labels)| labels.as_slice())
            .unwrap_or(&[])
    }

    /// The label reported for a first move.
    pub fn primary(&self, first_move: &str) -> Option<&str> {
        self.labels(first_move).first().map(String::as_str)
    }
}

impl Default for FirstMoveTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_FIRST_MOVES
                .iter()
                .map(|(mv, labels)| (*mv, labels.to_vec())),
        )
    }
}
