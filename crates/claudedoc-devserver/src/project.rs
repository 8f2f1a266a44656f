//! Locating the documentation project on disk
//!
//! The project directory holds the site under `site/`. Its location is
//! remembered in a small JSON file so later runs find it without a flag.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{DevServerError, Result};

/// `name` in `site/package.json` of a valid project
pub const SITE_PACKAGE_NAME: &str = "claude-code-doc-site";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedProject {
    project_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct SitePackage {
    #[serde(default)]
    name: Option<String>,
}

/// Per-user directory holding the persisted project path
#[must_use]
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("claude-code-doc"))
}

/// Resolves, validates and remembers the project directory
#[derive(Debug, Clone)]
pub struct ProjectLocator {
    config_file: PathBuf,
    default_project: PathBuf,
}

impl ProjectLocator {
    /// Locator persisting to `config_file`, falling back to `default_project`
    pub fn new(config_file: impl Into<PathBuf>, default_project: impl Into<PathBuf>) -> Self {
        Self {
            config_file: config_file.into(),
            default_project: default_project.into(),
        }
    }

    /// Locator using `~/.config/claude-code-doc/config.json`
    #[must_use]
    pub fn for_user(default_project: impl Into<PathBuf>) -> Self {
        let config_file = user_config_dir()
            .unwrap_or_else(|| PathBuf::from(".claude-code-doc"))
            .join("config.json");
        Self::new(config_file, default_project)
    }

    /// File the project path is persisted to
    #[must_use]
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Previously persisted project path, if readable
    #[must_use]
    pub fn persisted(&self) -> Option<PathBuf> {
        let text = fs::read_to_string(&self.config_file).ok()?;
        match serde_json::from_str::<PersistedProject>(&text) {
            Ok(persisted) => Some(persisted.project_path),
            Err(e) => {
                warn!("Ignoring unreadable {:?}: {}", self.config_file, e);
                None
            }
        }
    }

    /// Remember `project` for later runs
    ///
    /// # Errors
    /// Returns an error if the config file cannot be written
    pub fn persist(&self, project: &Path) -> Result<()> {
        if let Some(parent) = self.config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let persisted = PersistedProject {
            project_path: project.to_path_buf(),
        };
        fs::write(&self.config_file, serde_json::to_string_pretty(&persisted)?)?;
        debug!("Saved project path to {:?}", self.config_file);
        Ok(())
    }

    /// Pick the project directory and check it
    ///
    /// An explicit path wins and is persisted once it validates. Otherwise
    /// the persisted path is used if it still exists, then the default.
    ///
    /// # Errors
    /// Fails when no candidate exists or the chosen one is not a project
    pub fn resolve(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(project) = explicit {
            validate_project(project)?;
            self.persist(project)?;
            return Ok(project.to_path_buf());
        }

        let project = match self.persisted().filter(|p| p.is_dir()) {
            Some(project) => project,
            None if self.default_project.is_dir() => self.default_project.clone(),
            None => return Err(DevServerError::ProjectNotFound(self.default_project.clone())),
        };
        validate_project(&project)?;
        info!("Project root: {:?}", project);
        Ok(project)
    }
}

/// Check that `project/site/package.json` names the documentation site
///
/// # Errors
/// Returns [`DevServerError::InvalidProject`] describing the mismatch
pub fn validate_project(project: &Path) -> Result<()> {
    let invalid = |reason: String| DevServerError::InvalidProject {
        path: project.to_path_buf(),
        reason,
    };

    let manifest = project.join("site").join("package.json");
    let text = fs::read_to_string(&manifest)
        .map_err(|e| invalid(format!("cannot read {}: {e}", manifest.display())))?;
    let package: SitePackage =
        serde_json::from_str(&text).map_err(|e| invalid(format!("invalid package.json: {e}")))?;

    match package.name.as_deref() {
        Some(SITE_PACKAGE_NAME) => Ok(()),
        Some(other) => Err(invalid(format!("unexpected package name '{other}'"))),
        None => Err(invalid("package.json has no name".to_string())),
    }
}
