//! Error types for scanning a source tree

use std::path::PathBuf;
use thiserror::Error;

/// Scanner errors
///
/// Both variants abort the current pass. Per-item problems that only skip the
/// item are logged instead of returned.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Front matter that is not valid YAML
    #[error("malformed front matter in {path}: {source}")]
    FrontMatter {
        /// File whose front matter failed to parse
        path: PathBuf,
        /// Underlying YAML error
        #[source]
        source: serde_yaml::Error,
    },

    /// A source file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, ScanError>;
