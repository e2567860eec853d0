use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorksError {
    #[error("manifest {path:?} is unreadable: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },
    #[error("manifest order lists '{0}' more than once")]
    DuplicateId(String),
    #[error("listing page {path:?} is unreadable: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("index {path:?} is unreadable: {reason}")]
    Index { path: PathBuf, reason: String },
    #[error("no document mapping for '{0}'")]
    NoMapping(String),
    #[error("source document {0:?} not found")]
    MissingDocument(PathBuf),
    #[error("source document {path:?} is unreadable: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("record {path:?} could not be written: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl WorksError {
    /// Errors that end a whole run rather than a single work.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            WorksError::NoMapping(_)
                | WorksError::MissingDocument(_)
                | WorksError::Document { .. }
                | WorksError::Record { .. }
        )
    }
}
