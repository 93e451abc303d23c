#![allow(dead_code)]

use std::path::PathBuf;

use opening_classifier::{Catalogue, CatalogueRecord, OpeningEngine};

/// The catalogue shipped with the repo.
pub fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/openings")
}

pub fn bundled_catalogue() -> Catalogue {
    Catalogue::load(data_dir()).expect("bundled catalogue should load")
}

pub fn bundled_engine() -> OpeningEngine {
    OpeningEngine::new(bundled_catalogue())
}

pub fn empty_engine() -> OpeningEngine {
    OpeningEngine::new(Catalogue::empty())
}

/// Engine over `(eco, name, moves)` rows, in order.
pub fn engine_from(rows: &[(&str, &str, &str)]) -> OpeningEngine {
    OpeningEngine::new(Catalogue::from_records(
        rows.iter()
            .map(|(eco, name, moves)| CatalogueRecord::new(Some(*eco), name, moves)),
    ))
}
