//! Error types for building and serving the site

use std::path::PathBuf;
use thiserror::Error;

/// Dev server errors
#[derive(Debug, Error)]
pub enum DevServerError {
    /// A child process could not be spawned
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        /// Shell script that was run
        command: String,
        /// Underlying spawn error
        source: std::io::Error,
    },

    /// The site build exited unsuccessfully
    #[error("Build exited with code {code:?}")]
    BuildFailed {
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
    },

    /// The build finished but left no output directory
    #[error("Build directory not found at: {}", .0.display())]
    MissingBuildOutput(PathBuf),

    /// The project has no `site/` directory
    #[error("Site not found at: {}", .0.display())]
    SiteNotFound(PathBuf),

    /// The server process exited before it became ready
    #[error("Server exited with code {code:?}")]
    ServerExited {
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
    },

    /// The server did not answer within the start timeout
    #[error("Timeout waiting for server at {url} after {timeout}s")]
    StartupTimeout {
        /// Probed URL
        url: String,
        /// Timeout in seconds
        timeout: u64,
    },

    /// No project directory could be located
    #[error("No project found (looked for {})", .0.display())]
    ProjectNotFound(PathBuf),

    /// The directory is not a documentation project
    #[error("{} is not a Claude Code Doc project: {reason}", path.display())]
    InvalidProject {
        /// Rejected directory
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// HTTP client construction error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, DevServerError>;
