//! Storage error types.

use std::path::PathBuf;

/// Errors that can occur when writing to or reading from a partition.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The partition directory could not be created
    #[error("cannot create data directory {path}: {source}")]
    Dir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The partition file could not be opened
    #[error("cannot open partition {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    /// A statement failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be read back
    #[error("corrupt value in {table}.{column}: {value}")]
    Corrupt {
        table: &'static str,
        column: &'static str,
        value: String,
    },
}

impl StoreError {
    /// Whether the failure came from a table constraint (CHECK, NOT NULL,
    /// foreign key) rather than the database itself.
    pub fn is_constraint(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::Database(db)) => {
                !matches!(db.kind(), sqlx::error::ErrorKind::Other)
            }
            _ => false,
        }
    }
}
