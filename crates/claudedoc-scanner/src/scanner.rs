//! Source tree scanner

use claudedoc_types::{
    compare_names, Inventory, ItemDetail, ItemKind, SourceItem, INDEX_PAGE, PAGE_EXTENSION,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, ScanError};
use crate::frontmatter::parse_document;
use crate::skill::{is_skill_dir, load_skill};

/// Default name of per-directory instruction files
pub const DEFAULT_INSTRUCTION_FILE: &str = "CLAUDE.md";

/// Dependency cache directories are never descended into
const DEPENDENCY_DIR: &str = "node_modules";

/// Scans a Claude Code configuration root
///
/// ```no_run
/// use claudedoc_scanner::ContentScanner;
///
/// let inventory = ContentScanner::new("/home/me/.claude")
///     .exclude("/home/me/.claude/doc")
///     .scan()?;
/// println!("{} commands", inventory.commands.len());
/// # Ok::<(), claudedoc_scanner::ScanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ContentScanner {
    root: PathBuf,
    instruction_file: String,
    exclusions: Vec<PathBuf>,
}

impl ContentScanner {
    /// Scanner rooted at `root`; the version-control directory is excluded
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let exclusions = vec![root.join(".git")];
        Self {
            root,
            instruction_file: DEFAULT_INSTRUCTION_FILE.to_string(),
            exclusions,
        }
    }

    /// Use a different reserved instruction file name
    #[must_use]
    pub fn with_instruction_file(mut self, name: impl Into<String>) -> Self {
        self.instruction_file = name.into();
        self
    }

    /// Skip everything under `prefix` when looking for instruction files
    #[must_use]
    pub fn exclude(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.exclusions.push(prefix.into());
        self
    }

    /// Source root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserved instruction file name
    #[must_use]
    pub fn instruction_file(&self) -> &str {
        &self.instruction_file
    }

    /// Flat directory of command definitions
    #[must_use]
    pub fn commands_dir(&self) -> PathBuf {
        self.root.join("commands")
    }

    /// Directory of skill packages
    #[must_use]
    pub fn skills_dir(&self) -> PathBuf {
        self.root.join("skills")
    }

    /// Flat directory of agent definitions
    #[must_use]
    pub fn agents_dir(&self) -> PathBuf {
        self.root.join("agents")
    }

    /// Run one full pass over every kind
    ///
    /// # Errors
    /// Fails on malformed command front matter or an unreadable command file
    pub fn scan(&self) -> Result<Inventory> {
        info!("Scanning {:?}", self.root);

        let inventory = Inventory {
            instructions: self.scan_instructions(),
            commands: self.scan_commands()?,
            skills: self.scan_skills()?,
            agents: self.scan_agents()?,
        };

        let summary = inventory.summary();
        info!(
            "Found {} instruction files, {} commands, {} skills, {} agents",
            summary.instructions, summary.commands, summary.skills, summary.agents
        );
        Ok(inventory)
    }

    /// Every instruction file below the root, top-level file first
    ///
    /// Unreadable entries and broken links are skipped.
    #[must_use]
    pub fn scan_instructions(&self) -> Vec<SourceItem> {
        if !self.root.is_dir() {
            info!("Source root {:?} does not exist, no instruction files", self.root);
            return Vec::new();
        }

        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry.path()));

        let mut items = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || entry.file_name() != self.instruction_file.as_str()
            {
                continue;
            }

            match self.load_instruction(entry.path()) {
                Ok(item) => items.push(item),
                Err(e) => warn!("Skipping instruction file: {}", e),
            }
        }

        let mut items = without_reserved(dedupe_last_wins(items));
        items.sort_by(|a, b| {
            let a_root = a.identifier == "root";
            let b_root = b.identifier == "root";
            b_root
                .cmp(&a_root)
                .then_with(|| compare_names(&a.title, &b.title))
        });
        items
    }

    /// One command per `*.md` file
    ///
    /// # Errors
    /// Malformed front matter in any command aborts the pass
    pub fn scan_commands(&self) -> Result<Vec<SourceItem>> {
        let mut items = Vec::new();
        for path in markdown_files(&self.commands_dir(), ItemKind::Command)? {
            let stem = file_stem(&path);
            let content = fs::read_to_string(&path).map_err(|e| ScanError::io(&path, e))?;
            let doc = parse_document(&content).map_err(|source| ScanError::FrontMatter {
                path: path.clone(),
                source,
            })?;

            items.push(SourceItem {
                kind: ItemKind::Command,
                title: format!("/{stem}"),
                description: doc.front_matter.get_str("description").unwrap_or_default(),
                identifier: stem,
                body: doc.body,
                source_path: path,
                detail: ItemDetail::Command,
            });
        }
        Ok(sorted(without_reserved(dedupe_last_wins(items))))
    }

    /// One skill per directory holding a manifest
    ///
    /// # Errors
    /// Fails only when the skills directory itself cannot be listed
    pub fn scan_skills(&self) -> Result<Vec<SourceItem>> {
        let dir = self.skills_dir();
        if !dir.is_dir() {
            info!("No skills directory at {:?}", dir);
            return Ok(Vec::new());
        }

        let mut candidates: Vec<PathBuf> = fs::read_dir(&dir)
            .map_err(|e| ScanError::io(&dir, e))?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| is_skill_dir(path))
            .collect();
        candidates.sort();

        let mut items = Vec::new();
        for path in candidates {
            match load_skill(&path) {
                Ok(skill) => items.push(skill),
                Err(e) => warn!("Skipping skill {:?}: {}", path, e),
            }
        }
        Ok(sorted(without_reserved(dedupe_last_wins(items))))
    }

    /// One agent per `*.md` file; malformed files are skipped
    ///
    /// # Errors
    /// Fails only when the agents directory itself cannot be listed
    pub fn scan_agents(&self) -> Result<Vec<SourceItem>> {
        let mut items = Vec::new();
        for path in markdown_files(&self.agents_dir(), ItemKind::Agent)? {
            match load_agent(&path) {
                Ok(agent) => items.push(agent),
                Err(e) => warn!("Skipping agent {:?}: {}", path, e),
            }
        }
        Ok(sorted(without_reserved(dedupe_last_wins(items))))
    }

    fn is_excluded(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == DEPENDENCY_DIR)
            || self.exclusions.iter().any(|prefix| path.starts_with(prefix))
    }

    fn load_instruction(&self, path: &Path) -> Result<SourceItem> {
        let content = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative_path = to_slash(relative);
        let relative_dir = relative.parent().map(to_slash).unwrap_or_default();

        let identifier = if relative_dir.is_empty() {
            "root".to_string()
        } else {
            relative_dir.replace('/', "--")
        };

        Ok(SourceItem {
            kind: ItemKind::Instruction,
            identifier,
            title: format!("/{relative_path}"),
            description: format!("{} at /{}", self.instruction_file, relative_path),
            body: content,
            source_path: path.to_path_buf(),
            detail: ItemDetail::Instruction { relative_path },
        })
    }
}

fn load_agent(path: &Path) -> Result<SourceItem> {
    let stem = file_stem(path);
    let content = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
    let doc = parse_document(&content).map_err(|source| ScanError::FrontMatter {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(SourceItem {
        kind: ItemKind::Agent,
        title: doc
            .front_matter
            .non_empty("name")
            .unwrap_or_else(|| stem.clone()),
        description: doc.front_matter.get_str("description").unwrap_or_default(),
        identifier: stem,
        body: doc.body,
        source_path: path.to_path_buf(),
        detail: ItemDetail::Agent {
            model: doc.front_matter.non_empty("model"),
        },
    })
}

/// `*.md` files directly inside `dir`, sorted by path
fn markdown_files(dir: &Path, kind: ItemKind) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        info!("No {} directory at {:?}", kind.dir_name(), dir);
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| ScanError::io(dir, e))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    files.sort();
    Ok(files)
}

/// Keep the last item for each identifier, in first-seen position
fn dedupe_last_wins(items: Vec<SourceItem>) -> Vec<SourceItem> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<SourceItem> = Vec::with_capacity(items.len());

    for item in items {
        if let Some(&index) = seen.get(&item.identifier) {
            warn!(
                "Duplicate {:?} identifier '{}': {:?} replaces {:?}",
                item.kind, item.identifier, item.source_path, out[index].source_path
            );
            out[index] = item;
        } else {
            seen.insert(item.identifier.clone(), out.len());
            out.push(item);
        }
    }
    out
}

/// Drop items whose page would take the place of their kind's index page
fn without_reserved(items: Vec<SourceItem>) -> Vec<SourceItem> {
    items
        .into_iter()
        .filter(|item| {
            let page = format!("{}.{PAGE_EXTENSION}", item.identifier);
            let reserved = page.eq_ignore_ascii_case(INDEX_PAGE);
            if reserved {
                warn!(
                    "Skipping {:?} {:?}: identifier '{}' is reserved for the index page",
                    item.kind, item.source_path, item.identifier
                );
            }
            !reserved
        })
        .collect()
}

fn sorted(mut items: Vec<SourceItem>) -> Vec<SourceItem> {
    items.sort_by(|a, b| compare_names(a.sort_name(), b.sort_name()));
    items
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
