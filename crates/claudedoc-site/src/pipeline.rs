//! One generation pass: scan, render, reconcile, then navigation and titles

use claudedoc_render::{build_navigation, PageRenderer};
use claudedoc_types::{NavigationNode, RegenerationSummary, PAGE_EXTENSION};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::SiteConfig;
use crate::error::{Result, SiteError};
use crate::reconcile::{write_if_changed, ReconcileReport, Reconciler};
use crate::titles::collect_titles;

/// What a generation pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub summary: RegenerationSummary,
    pub pages: ReconcileReport,
    /// The sidebar file changed
    pub navigation_written: bool,
    /// The title lookup file changed
    pub titles_written: bool,
}

/// Run the full pipeline once
///
/// Navigation is derived only after the reconciler has committed, and every
/// doc id it names is checked against the output directory.
pub fn generate(config: &SiteConfig) -> Result<GenerationReport> {
    config.validate()?;
    let started = Instant::now();
    let output_root = config.output_root();
    info!(
        "Generating docs from {:?} into {:?}",
        config.source_root, output_root
    );

    let inventory = config.scanner().scan()?;

    let renderer = PageRenderer::new(config.render_options());
    let pages = renderer.render_site(&inventory);
    debug!("Rendered {} pages", pages.len());

    let report = Reconciler::new(&output_root).reconcile(&pages)?;

    let navigation = build_navigation(&inventory, &config.docs_prefix);
    verify_navigation(&navigation, &config.docs_prefix, &output_root)?;
    let navigation_written = write_json(&config.navigation_file(), &navigation)?;

    let titles = collect_titles(&config.docs_root());
    let titles_written = write_json(&config.titles_file(), &titles)?;

    let summary = inventory.summary();
    info!(
        "Generated {} CLAUDE.md, {} commands, {} skills, {} agents in {:?}",
        summary.instructions,
        summary.commands,
        summary.skills,
        summary.agents,
        started.elapsed()
    );

    Ok(GenerationReport {
        summary,
        pages: report,
        navigation_written,
        titles_written,
    })
}

/// Every doc id in the tree must resolve to a committed page
fn verify_navigation(nodes: &[NavigationNode], prefix: &str, output_root: &Path) -> Result<()> {
    for id in nodes.iter().flat_map(NavigationNode::doc_ids) {
        let relative = id
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| SiteError::MissingPage(id.to_string()))?;
        let page = output_root.join(format!("{relative}.{PAGE_EXTENSION}"));
        if !page.is_file() {
            return Err(SiteError::MissingPage(id.to_string()));
        }
    }
    Ok(())
}

/// Pretty JSON with a trailing newline, written only when it changed
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<bool> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| SiteError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');

    let written = write_if_changed(path, &text)?;
    if written {
        debug!("Updated {:?}", path);
    }
    Ok(written)
}
