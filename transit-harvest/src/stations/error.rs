//! Station list error types.

use std::path::PathBuf;

/// Errors that can occur when loading a station list.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// The file could not be opened or read
    #[error("cannot read station file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A row is too short to carry an identifier
    #[error("station file line {line}: expected at least 4 columns, found {found}")]
    ShortRow { line: u64, found: usize },

    /// The identifier column does not hold a usable id
    #[error("station file line {line}: {message}")]
    InvalidId { line: u64, message: String },
}
