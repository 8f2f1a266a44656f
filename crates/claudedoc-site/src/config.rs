//! Site configuration and the paths derived from it

use claudedoc_render::{EscapeDepth, RenderOptions};
use claudedoc_scanner::ContentScanner;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, SiteError};

/// Where sources are read from and where the site lives
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SiteConfig {
    /// Claude Code configuration root
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// Documentation site root; `{source_root}/doc/site` when unset
    #[serde(default)]
    pub site_root: Option<PathBuf>,

    /// Doc id prefix and output directory name under `docs/`
    #[serde(default = "default_docs_prefix")]
    pub docs_prefix: String,

    /// Label of the top-level section
    #[serde(default = "default_section_label")]
    pub section_label: String,

    #[serde(default)]
    pub escape: EscapeDepth,

    /// Reserved name of per-directory instruction files
    #[serde(default = "default_instruction_file")]
    pub instruction_file: String,
}

fn default_source_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".claude")
}

fn default_docs_prefix() -> String {
    "claude".to_string()
}

fn default_section_label() -> String {
    "Claude".to_string()
}

fn default_instruction_file() -> String {
    "CLAUDE.md".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            site_root: None,
            docs_prefix: default_docs_prefix(),
            section_label: default_section_label(),
            escape: EscapeDepth::default(),
            instruction_file: default_instruction_file(),
        }
    }
}

impl SiteConfig {
    /// Config for `source_root` with every other setting at its default
    pub fn for_source(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            ..Default::default()
        }
    }

    /// Reject settings that would point the output directory outside `docs/{name}`
    ///
    /// # Errors
    /// Returns [`SiteError::InvalidPrefix`] unless the prefix is one plain
    /// directory name.
    pub fn validate(&self) -> Result<()> {
        let prefix = self.docs_prefix.as_str();
        let mut components = Path::new(prefix).components();
        let single_name = matches!(components.next(), Some(Component::Normal(_)))
            && components.next().is_none();
        if !single_name || prefix.contains(['/', '\\']) {
            return Err(SiteError::InvalidPrefix(prefix.to_string()));
        }
        Ok(())
    }

    pub fn site_root(&self) -> PathBuf {
        self.site_root
            .clone()
            .unwrap_or_else(|| self.source_root.join("doc").join("site"))
    }

    /// The site's `docs/` directory
    pub fn docs_root(&self) -> PathBuf {
        self.site_root().join("docs")
    }

    /// Directory owned by the generator: `docs/{prefix}`
    pub fn output_root(&self) -> PathBuf {
        self.docs_root().join(&self.docs_prefix)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.site_root().join("src").join("data")
    }

    /// Sidebar file loaded by the site
    pub fn navigation_file(&self) -> PathBuf {
        self.data_dir()
            .join(format!("{}-sidebar.json", self.docs_prefix))
    }

    pub fn titles_file(&self) -> PathBuf {
        self.data_dir().join("doc-titles.json")
    }

    /// Source root as shown to readers, with the home directory as `~`
    pub fn source_label(&self) -> String {
        display_path(&self.source_root, dirs::home_dir().as_deref())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            docs_prefix: self.docs_prefix.clone(),
            section_label: self.section_label.clone(),
            source_label: self.source_label(),
            escape: self.escape,
        }
    }

    /// Scanner over the source root that never descends into the site
    pub fn scanner(&self) -> ContentScanner {
        ContentScanner::new(&self.source_root)
            .with_instruction_file(&self.instruction_file)
            .exclude(self.site_root())
    }
}

fn display_path(path: &Path, home: Option<&Path>) -> String {
    let shown = match home.and_then(|home| path.strip_prefix(home).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    };
    shown.trim_end_matches('/').to_string()
}
