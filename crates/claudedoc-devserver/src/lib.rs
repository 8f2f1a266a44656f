//! `ClaudeDoc` site server support
//!
//! Runs the documentation site's own toolchain as external processes.
//!
//! ## Features
//!
//! - Build the static site and serve it on a fixed local port
//! - HTTP HEAD readiness polling with a start timeout
//! - Hot-reloading dev server for watch mode
//! - Persisted project directory with validation
//! - Child output forwarded to the log, process groups stopped together

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod config;
pub mod error;
pub mod process;
pub mod project;
pub mod readiness;
pub mod server;

pub use config::ServerConfig;
pub use error::{DevServerError, Result};
pub use process::{build_site, spawn_dev_server, ServerProcess};
pub use project::{user_config_dir, validate_project, ProjectLocator, SITE_PACKAGE_NAME};
pub use readiness::ReadinessProbe;
pub use server::StaticServer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{DevServerError, ProjectLocator, ServerConfig, StaticServer};
}
