//! Skill package loading
//!
//! Each skill is a folder containing SKILL.md with YAML frontmatter, plus
//! optional `references/`, `scripts/` and `assets/` subdirectories.

use claudedoc_types::{compare_names, ItemDetail, ItemKind, SkillResources, SourceItem};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, ScanError};
use crate::frontmatter::{first_heading, parse_document};

/// Manifest file that marks a directory as a skill
pub const SKILL_MANIFEST: &str = "SKILL.md";
/// Optional subdirectory holding reference documents
pub const REFERENCES_DIR: &str = "references";
/// Optional subdirectory holding helper scripts
pub const SCRIPTS_DIR: &str = "scripts";
/// Optional subdirectory holding bundled assets
pub const ASSETS_DIR: &str = "assets";

/// True when `dir` contains a skill manifest
#[must_use]
pub fn is_skill_dir(dir: &Path) -> bool {
    dir.is_dir() && dir.join(SKILL_MANIFEST).is_file()
}

/// Load a skill package from its directory
///
/// # Errors
/// [`ScanError::FrontMatter`] when the manifest header is malformed, which the
/// caller treats as a per-item skip; [`ScanError::Io`] when a file cannot be read
pub fn load_skill(dir: &Path) -> Result<SourceItem> {
    let dir_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let manifest = dir.join(SKILL_MANIFEST);

    let content = fs::read_to_string(&manifest).map_err(|e| ScanError::io(&manifest, e))?;
    let doc = parse_document(&content).map_err(|source| ScanError::FrontMatter {
        path: manifest.clone(),
        source,
    })?;

    let title = doc
        .front_matter
        .non_empty("name")
        .unwrap_or_else(|| dir_name.clone());
    let description = doc.front_matter.get_str("description").unwrap_or_default();

    let references = load_references(dir, &dir_name, &title)?;
    let resources = SkillResources {
        has_scripts: dir.join(SCRIPTS_DIR).exists(),
        has_assets: dir.join(ASSETS_DIR).exists(),
    };

    debug!(
        "Loaded skill '{}' ({} references) from {:?}",
        title,
        references.len(),
        dir
    );

    Ok(SourceItem {
        kind: ItemKind::Skill,
        identifier: dir_name,
        title,
        description,
        body: doc.body,
        source_path: manifest,
        detail: ItemDetail::Skill {
            references,
            resources,
        },
    })
}

/// Reference documents under `references/`, sorted by file stem
fn load_references(dir: &Path, skill_id: &str, skill_title: &str) -> Result<Vec<SourceItem>> {
    let refs_dir = dir.join(REFERENCES_DIR);
    if !refs_dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(&refs_dir).map_err(|e| ScanError::io(&refs_dir, e))?;
    let mut references = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| ScanError::io(&refs_dir, e))?;
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = fs::read_to_string(&path).map_err(|e| ScanError::io(&path, e))?;
        let title = first_heading(&content).unwrap_or_else(|| stem.clone());

        references.push(SourceItem {
            kind: ItemKind::SkillReference,
            identifier: stem,
            title,
            description: String::new(),
            body: content,
            source_path: path,
            detail: ItemDetail::Reference {
                skill: skill_id.to_string(),
                skill_title: skill_title.to_string(),
            },
        });
    }

    references.sort_by(|a, b| compare_names(&a.identifier, &b.identifier));
    Ok(references)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_skill_with_references_and_resources() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("pdf-combine");
        write(
            &dir.join(SKILL_MANIFEST),
            "---\nname: pdf-combine\ndescription: Merge PDFs\n---\n# PDF\n",
        );
        write(&dir.join("references/zeta.md"), "# Zeta Notes\n");
        write(&dir.join("references/alpha.md"), "no heading here\n");
        write(&dir.join("references/ignored.txt"), "not markdown");
        write(&dir.join("scripts/combine.py"), "print()");

        let skill = load_skill(&dir).unwrap();
        assert_eq!(skill.identifier, "pdf-combine");
        assert_eq!(skill.title, "pdf-combine");
        assert_eq!(skill.description, "Merge PDFs");

        let ItemDetail::Skill {
            references,
            resources,
        } = &skill.detail
        else {
            panic!("expected skill detail");
        };
        assert!(resources.has_scripts);
        assert!(!resources.has_assets);

        let ids: Vec<_> = references.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
        assert_eq!(references[0].title, "alpha");
        assert_eq!(references[1].title, "Zeta Notes");
    }

    #[test]
    fn test_name_falls_back_to_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("headless-browser");
        write(&dir.join(SKILL_MANIFEST), "# Headless\n");

        let skill = load_skill(&dir).unwrap();
        assert_eq!(skill.title, "headless-browser");
        assert!(skill.references().is_empty());
    }

    #[test]
    fn test_malformed_manifest_reports_front_matter_error() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("broken");
        write(&dir.join(SKILL_MANIFEST), "---\nname: [oops\n---\n");

        let err = load_skill(&dir).unwrap_err();
        assert!(matches!(err, ScanError::FrontMatter { .. }));
    }

    #[test]
    fn test_is_skill_dir_requires_manifest() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("plain");
        fs::create_dir_all(&dir).unwrap();
        assert!(!is_skill_dir(&dir));
        write(&dir.join(SKILL_MANIFEST), "x");
        assert!(is_skill_dir(&dir));
    }
}
