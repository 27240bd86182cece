use std::path::PathBuf;

use crate::model::ModelError;
use crate::network::NetworkError;

/// Error loading a data file.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to load CSV {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A record parsed but its contents are invalid
    #[error("{} line {line}: {reason}", path.display())]
    InvalidRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}
