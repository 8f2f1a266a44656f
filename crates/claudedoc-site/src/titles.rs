//! Doc id to display title lookup for the site's sitemap component

use claudedoc_scanner::{first_heading, parse_document};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Map every `.md`/`.mdx` page under `docs_root` to its title
///
/// The title comes from the page's `title` metadata, else its first `# `
/// heading; pages with neither are left out. Doc ids drop the extension
/// and `x/index` becomes `x`.
pub fn collect_titles(docs_root: &Path) -> BTreeMap<String, String> {
    let mut titles = BTreeMap::new();
    if !docs_root.is_dir() {
        return titles;
    }

    for entry in WalkDir::new(docs_root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable docs entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(id) = entry
            .path()
            .strip_prefix(docs_root)
            .ok()
            .and_then(doc_id_for)
        else {
            continue;
        };

        let content = match fs::read_to_string(entry.path()) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping {:?} for titles: {}", entry.path(), e);
                continue;
            }
        };

        if let Some(title) = extract_title(&content) {
            titles.insert(id, title);
        }
    }

    titles
}

fn doc_id_for(relative: &Path) -> Option<String> {
    let text = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let stem = text
        .strip_suffix(".mdx")
        .or_else(|| text.strip_suffix(".md"))?;
    Some(stem.strip_suffix("/index").unwrap_or(stem).to_string())
}

fn extract_title(content: &str) -> Option<String> {
    match parse_document(content) {
        Ok(doc) => doc
            .front_matter
            .non_empty("title")
            .or_else(|| first_heading(&doc.body)),
        Err(_) => first_heading(content),
    }
}
