//! Stats recorder errors

use std::path::PathBuf;

/// Errors raised while persisting or re-reading result records.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to prepare {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid record in {path:?}: {message}")]
    InvalidRecord { path: PathBuf, message: String },
}
