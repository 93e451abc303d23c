//! Catalogue error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("Failed to read catalogue {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalogue JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid catalogue glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("No .tsv or .json catalogue files in {0}")]
    NoSources(String),
}
