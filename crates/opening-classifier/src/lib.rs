pub mod catalogue;
pub mod classify;
pub mod error;
pub mod first_moves;
pub mod options;
pub mod path;
pub mod pattern;
pub mod result;
pub mod scorer;

pub use catalogue::{Catalogue, CatalogueRecord, OpeningEntry};
pub use classify::OpeningEngine;
pub use error::CatalogueError;
pub use first_moves::FirstMoveTable;
pub use options::ClassifyOptions;
pub use pattern::PatternRule;
pub use result::{AnalysisResult, LevelDiagnostic, MatchSource, MatchStatus, ProgressionStep};
pub use scorer::ScoreOrder;
