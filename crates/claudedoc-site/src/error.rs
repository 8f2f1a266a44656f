//! Error types for generating the site

use claudedoc_scanner::ScanError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a generation pass
#[derive(Debug, Error)]
pub enum SiteError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("filesystem error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("page path escapes the output root: {0}")]
    InvalidPagePath(String),

    #[error("navigation references missing page: {0}")]
    MissingPage(String),

    #[error("docs prefix must be a single directory name, got {0:?}")]
    InvalidPrefix(String),

    #[error("two pages render to the same path: {0}")]
    DuplicatePage(String),
}

impl SiteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SiteError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
