//! Kind-level and root index pages

use claudedoc_types::{GeneratedPage, Inventory, ItemDetail, ItemKind, SourceItem, INDEX_PAGE};

use crate::page::{page_path, PageBuilder, PageRenderer};
use crate::text::{truncate, LIST_DESCRIPTION_MAX};

/// One-line blurb for each kind, used on the root index
fn blurb(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Instruction => "Project-specific instructions",
        ItemKind::Command => "Custom slash commands",
        ItemKind::Skill => "Skill packages with specialized capabilities",
        ItemKind::Agent => "Custom subagents",
        ItemKind::SkillReference => "Skill reference documents",
    }
}

fn index_header() -> PageBuilder {
    PageBuilder::new()
        .meta("sidebar_position", "1")
        .meta("pagination_next", "null")
        .meta("pagination_prev", "null")
}

impl PageRenderer {
    /// Index page listing every item of one kind
    pub fn kind_index(&self, kind: ItemKind, items: &[SourceItem]) -> GeneratedPage {
        let source = &self.options().source_label;
        let (intro, heading) = match kind {
            ItemKind::Instruction => (
                format!(
                    "CLAUDE.md files found under `{source}/`.\n\n\
                     CLAUDE.md files provide project-specific instructions to Claude Code."
                ),
                "Files",
            ),
            ItemKind::Command => (
                format!("Custom slash commands from `{source}/commands/`."),
                "Available Commands",
            ),
            ItemKind::Skill => (
                format!("Skill packages from `{source}/skills/`."),
                "Available Skills",
            ),
            ItemKind::Agent => (
                format!("Subagent definitions from `{source}/agents/`."),
                "Available Agents",
            ),
            ItemKind::SkillReference => (String::new(), "References"),
        };

        let list = items
            .iter()
            .map(|item| self.list_entry(item))
            .collect::<Vec<_>>()
            .join("\n");

        let content = index_header()
            .section(format!("# {}", kind.label()))
            .section(intro)
            .section(format!("## {heading} ({})", items.len()))
            .section(list)
            .build();

        GeneratedPage::new(format!("{}/{INDEX_PAGE}", kind.dir_name()), content)
    }

    fn list_entry(&self, item: &SourceItem) -> String {
        let file = page_path(item);
        let file = file.rsplit('/').next().unwrap_or(&file);

        let note = match &item.detail {
            ItemDetail::Skill { references, .. } if !references.is_empty() => {
                format!(" ({} refs)", references.len())
            }
            ItemDetail::Agent { model: Some(model) } => format!(" ({model})"),
            _ => String::new(),
        };

        let description = item.description.split_whitespace().collect::<Vec<_>>().join(" ");
        let description = if description.is_empty() || item.kind == ItemKind::Instruction {
            String::new()
        } else {
            format!(" - {}", self.escape(&truncate(&description, LIST_DESCRIPTION_MAX)))
        };

        format!("- [`{}`](./{file}){note}{description}", item.title)
    }

    /// Root index: links to each populated kind, a count for every kind and
    /// a sketch of the source tree
    pub fn root_index(&self, inventory: &Inventory) -> GeneratedPage {
        let options = self.options();

        let contents = inventory
            .populated_kinds()
            .map(|kind| {
                format!(
                    "- **[{}](./{}/{INDEX_PAGE})** ({}) - {}",
                    kind.label(),
                    kind.dir_name(),
                    inventory.items(kind).len(),
                    blurb(kind)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut summary = String::from("## Summary\n\n| Kind | Count |\n|---|---|");
        for kind in ItemKind::TOP_LEVEL {
            let count = inventory.items(kind).len();
            let label = if count > 0 {
                format!("[{}](./{}/{INDEX_PAGE})", kind.label(), kind.dir_name())
            } else {
                kind.label().to_string()
            };
            summary.push_str(&format!("\n| {label} | {count} |"));
        }

        let content = index_header()
            .section(format!("# {}", self.escape(&options.section_label)))
            .section(format!(
                "Claude Code configuration reference for `{}/`.",
                options.source_label
            ))
            .section(if contents.is_empty() {
                String::new()
            } else {
                format!("## Contents\n\n{contents}")
            })
            .section(summary)
            .section(format!(
                "## Directory Structure\n\n```\n{}\n```",
                directory_tree(&options.source_label, inventory)
            ))
            .build();

        GeneratedPage::new(INDEX_PAGE, content)
    }
}

fn directory_tree(source_label: &str, inventory: &Inventory) -> String {
    let mut lines = vec![format!("{source_label}/")];
    for kind in inventory.populated_kinds() {
        let count = inventory.items(kind).len();
        let line = match kind {
            ItemKind::Instruction => format!("├── CLAUDE.md     # Project instructions ({count} files)"),
            ItemKind::Command => format!("├── commands/     # Custom slash commands ({count} files)"),
            ItemKind::Skill => format!("├── skills/       # Skill packages ({count} dirs)"),
            ItemKind::Agent => {
                format!("├── agents/       # Custom subagent definitions ({count} files)")
            }
            ItemKind::SkillReference => continue,
        };
        lines.push(line);
    }
    lines.push("├── settings.json # Claude Code settings".to_string());
    lines.push("└── ...".to_string());
    lines.join("\n")
}
