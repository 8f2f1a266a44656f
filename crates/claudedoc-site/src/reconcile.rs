//! Committing a page set to the output directory
//!
//! Every expected page is written first, and only then is anything stale
//! removed, so a watcher on the output directory never sees a page that
//! existed before the pass go missing. Unchanged pages are not rewritten.

use claudedoc_types::GeneratedPage;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, SiteError};

/// Hand-maintained category metadata the site generator reads
pub const CATEGORY_FILE: &str = "_category_.json";

/// Outcome of one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Pages whose content changed, relative to the output root
    pub written: Vec<String>,
    /// Pages already up to date
    pub unchanged: usize,
    /// Stale files and directories deleted, relative to the output root
    pub removed: Vec<PathBuf>,
}

/// Owns the file set under one output directory
#[derive(Debug, Clone)]
pub struct Reconciler {
    root: PathBuf,
    preserve: Vec<String>,
}

impl Reconciler {
    /// Reconciler for `root`; `_category_.json` files are always kept
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            preserve: vec![CATEGORY_FILE.to_string()],
        }
    }

    /// Never delete files with this name
    pub fn preserve(mut self, file_name: impl Into<String>) -> Self {
        self.preserve.push(file_name.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Make the output directory hold exactly `pages`
    ///
    /// Two pages with the same path are rejected before anything is written.
    /// Filesystem errors abort the pass and may leave a mix of old and new
    /// files; the next successful pass converges.
    pub fn reconcile(&self, pages: &[GeneratedPage]) -> Result<ReconcileReport> {
        let mut claimed = BTreeSet::new();
        if let Some(page) = pages
            .iter()
            .find(|page| !claimed.insert(page.relative_path.as_str()))
        {
            return Err(SiteError::DuplicatePage(page.relative_path.clone()));
        }

        fs::create_dir_all(&self.root).map_err(|e| SiteError::io(&self.root, e))?;

        let mut report = ReconcileReport::default();
        let mut expected_files = BTreeSet::new();
        let mut expected_dirs = BTreeSet::new();

        for page in pages {
            let relative = checked_relative(&page.relative_path)?;
            if write_if_changed(&self.root.join(&relative), &page.content)? {
                debug!("Updated {}", page.relative_path);
                report.written.push(page.relative_path.clone());
            } else {
                report.unchanged += 1;
            }

            let mut ancestor = relative.parent();
            while let Some(dir) = ancestor.filter(|d| !d.as_os_str().is_empty()) {
                expected_dirs.insert(dir.to_path_buf());
                ancestor = dir.parent();
            }
            expected_files.insert(relative);
        }

        let expected = Expected {
            files: &expected_files,
            dirs: &expected_dirs,
            preserve: &self.preserve,
        };
        self.remove_stale(&self.root, Path::new(""), &expected, &mut report.removed)?;

        if !report.written.is_empty() || !report.removed.is_empty() {
            info!(
                "Reconciled {:?}: {} written, {} unchanged, {} removed",
                self.root,
                report.written.len(),
                report.unchanged,
                report.removed.len()
            );
        }
        Ok(report)
    }

    /// Delete everything under `dir` that is neither expected nor preserved
    ///
    /// Returns true when `dir` is left empty.
    fn remove_stale(
        &self,
        dir: &Path,
        relative: &Path,
        expected: &Expected<'_>,
        removed: &mut Vec<PathBuf>,
    ) -> Result<bool> {
        let mut entries = fs::read_dir(dir)
            .map_err(|e| SiteError::io(dir, e))?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| SiteError::io(dir, e))?;
        entries.sort_by_key(fs::DirEntry::file_name);

        let mut kept = 0usize;
        for entry in entries {
            let path = entry.path();
            let name = entry.file_name();
            let rel = relative.join(&name);
            let file_type = entry.file_type().map_err(|e| SiteError::io(&path, e))?;

            if file_type.is_dir() {
                let emptied = self.remove_stale(&path, &rel, expected, removed)?;
                if emptied && !expected.dirs.contains(&rel) {
                    fs::remove_dir(&path).map_err(|e| SiteError::io(&path, e))?;
                    info!("Removed stale directory {:?}", rel);
                    removed.push(rel);
                } else {
                    kept += 1;
                }
            } else if expected.files.contains(&rel)
                || expected.preserve.iter().any(|p| name == p.as_str())
            {
                kept += 1;
            } else {
                fs::remove_file(&path).map_err(|e| SiteError::io(&path, e))?;
                info!("Removed stale file {:?}", rel);
                removed.push(rel);
            }
        }
        Ok(kept == 0)
    }
}

struct Expected<'a> {
    files: &'a BTreeSet<PathBuf>,
    dirs: &'a BTreeSet<PathBuf>,
    preserve: &'a [String],
}

/// `/`-separated page path as a relative path that stays under the root
fn checked_relative(page_path: &str) -> Result<PathBuf> {
    let relative = PathBuf::from(page_path);
    let escapes = relative.as_os_str().is_empty()
        || relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        return Err(SiteError::InvalidPagePath(page_path.to_string()));
    }
    Ok(relative)
}

/// Write `content` to `path` unless it already holds exactly that
///
/// Returns true when the file was written.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    match fs::read(path) {
        Ok(existing) if existing == content.as_bytes() => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(SiteError::io(path, e)),
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SiteError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| SiteError::io(path, e))?;
    Ok(true)
}
