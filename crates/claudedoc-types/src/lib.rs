//! ClaudeDoc Types - Core types for the documentation generator
//!
//! This module defines the data model shared by the scanner, the renderer,
//! the reconciler and the navigation builder.

pub mod events;
pub mod nav;

pub use events::{Event, EventBus, RegenerationSummary};
pub use nav::{NavCategory, NavLink, NavigationNode};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;

/// Extension used for every generated page
pub const PAGE_EXTENSION: &str = "mdx";

/// File name of a kind-level or root index page
pub const INDEX_PAGE: &str = "index.mdx";

/// Kind of a discovered content unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    Instruction,
    Command,
    Skill,
    Agent,
    SkillReference,
}

impl ItemKind {
    /// The four top-level kinds, in navigation order
    pub const TOP_LEVEL: [ItemKind; 4] = [
        ItemKind::Instruction,
        ItemKind::Command,
        ItemKind::Skill,
        ItemKind::Agent,
    ];

    /// Output directory name under the output root
    pub fn dir_name(self) -> &'static str {
        match self {
            ItemKind::Instruction => "claudemd",
            ItemKind::Command => "commands",
            ItemKind::Skill | ItemKind::SkillReference => "skills",
            ItemKind::Agent => "agents",
        }
    }

    /// Display label used for headings and navigation categories
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Instruction => "CLAUDE.md",
            ItemKind::Command => "Commands",
            ItemKind::Skill => "Skills",
            ItemKind::Agent => "Agents",
            ItemKind::SkillReference => "References",
        }
    }
}

/// Bundled resource directories shipped next to a skill manifest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillResources {
    pub has_scripts: bool,
    pub has_assets: bool,
}

/// Kind-specific data carried by a [`SourceItem`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemDetail {
    Instruction {
        /// Path relative to the source root, `/`-separated
        relative_path: String,
    },
    Command,
    Skill {
        references: Vec<SourceItem>,
        resources: SkillResources,
    },
    Agent {
        model: Option<String>,
    },
    Reference {
        /// Identifier of the owning skill
        skill: String,
        /// Display title of the owning skill
        skill_title: String,
    },
}

/// One discovered content unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceItem {
    pub kind: ItemKind,
    pub identifier: String,
    pub title: String,
    pub description: String,
    /// Raw body, not yet escaped
    pub body: String,
    pub source_path: PathBuf,
    pub detail: ItemDetail,
}

impl SourceItem {
    /// References owned by a skill; empty for every other kind
    pub fn references(&self) -> &[SourceItem] {
        match &self.detail {
            ItemDetail::Skill { references, .. } => references,
            _ => &[],
        }
    }

    /// Name used for ordering within a kind
    pub fn sort_name(&self) -> &str {
        match self.kind {
            ItemKind::Command | ItemKind::SkillReference => &self.identifier,
            _ => &self.title,
        }
    }
}

/// Everything discovered in one scanner pass, ordered by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub instructions: Vec<SourceItem>,
    pub commands: Vec<SourceItem>,
    pub skills: Vec<SourceItem>,
    pub agents: Vec<SourceItem>,
}

impl Inventory {
    /// Items of one top-level kind
    pub fn items(&self, kind: ItemKind) -> &[SourceItem] {
        match kind {
            ItemKind::Instruction => &self.instructions,
            ItemKind::Command => &self.commands,
            ItemKind::Skill => &self.skills,
            ItemKind::Agent => &self.agents,
            ItemKind::SkillReference => &[],
        }
    }

    /// Top-level kinds that have at least one item
    pub fn populated_kinds(&self) -> impl Iterator<Item = ItemKind> + '_ {
        ItemKind::TOP_LEVEL
            .into_iter()
            .filter(|kind| !self.items(*kind).is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.populated_kinds().next().is_none()
    }

    pub fn summary(&self) -> RegenerationSummary {
        RegenerationSummary {
            instructions: self.instructions.len(),
            commands: self.commands.len(),
            skills: self.skills.len(),
            agents: self.agents.len(),
        }
    }
}

/// One output document, addressed relative to the output root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPage {
    /// `/`-separated path relative to the output root, e.g. `commands/foo.mdx`
    pub relative_path: String,
    pub content: String,
}

impl GeneratedPage {
    pub fn new(relative_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            content: content.into(),
        }
    }

    /// Site doc id for this page
    pub fn doc_id(&self, prefix: &str) -> String {
        doc_id(prefix, &self.relative_path)
    }
}

/// Site doc id for a page path: prefix + path without extension
pub fn doc_id(prefix: &str, relative_path: &str) -> String {
    let stem = relative_path
        .strip_suffix(&format!(".{PAGE_EXTENSION}"))
        .unwrap_or(relative_path);
    format!("{prefix}/{stem}")
}

/// Compare two names the way a locale-aware collator does for plain
/// identifiers: letters compare case-insensitively first, punctuation sorts
/// before digits and digits before letters, and on a full tie lowercase comes
/// before uppercase.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    fn rank(c: char) -> (u8, char) {
        if c.is_alphabetic() {
            (2, c.to_lowercase().next().unwrap_or(c))
        } else if c.is_numeric() {
            (1, c)
        } else {
            (0, c)
        }
    }

    let primary = a.chars().map(rank).cmp(b.chars().map(rank));
    primary.then_with(|| {
        // Tertiary level: lowercase before uppercase at the first difference
        for (x, y) in a.chars().zip(b.chars()) {
            if x != y {
                return match (x.is_lowercase(), y.is_lowercase()) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => x.cmp(&y),
                };
            }
        }
        a.len().cmp(&b.len())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_names_case_insensitive_first() {
        let mut names = vec!["foo", "Bar", "baz", "apple"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["apple", "Bar", "baz", "foo"]);
    }

    #[test]
    fn test_compare_names_lowercase_wins_tie() {
        assert_eq!(compare_names("review", "Review"), Ordering::Less);
        assert_eq!(compare_names("Review", "review"), Ordering::Greater);
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_compare_names_punctuation_and_digits() {
        let mut names = vec!["a1", "a-b", "ab", "a"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["a", "a-b", "a1", "ab"]);
    }

    #[test]
    fn test_doc_id_strips_extension() {
        let page = GeneratedPage::new("skills/pdf/usage.mdx", "");
        assert_eq!(page.doc_id("claude"), "claude/skills/pdf/usage");
    }

    #[test]
    fn test_populated_kinds_skips_empty() {
        let item = SourceItem {
            kind: ItemKind::Command,
            identifier: "foo".into(),
            title: "/foo".into(),
            description: String::new(),
            body: String::new(),
            source_path: PathBuf::from("/tmp/foo.md"),
            detail: ItemDetail::Command,
        };
        let inventory = Inventory {
            commands: vec![item],
            ..Default::default()
        };
        let kinds: Vec<_> = inventory.populated_kinds().collect();
        assert_eq!(kinds, vec![ItemKind::Command]);
        assert!(!inventory.is_empty());
        assert!(Inventory::default().is_empty());
    }
}
