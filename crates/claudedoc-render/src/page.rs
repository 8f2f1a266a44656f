//! Per-item page rendering

use claudedoc_types::{
    GeneratedPage, ItemDetail, ItemKind, SkillResources, SourceItem, PAGE_EXTENSION,
};

use crate::escape::{escape_mdx, EscapeDepth};
use crate::text::yaml_quote;

/// Settings shared by every page of one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Doc id prefix, also the output directory name under `docs/`
    pub docs_prefix: String,
    /// Heading of the root index page
    pub section_label: String,
    /// Source root as shown to readers, e.g. `~/.claude`
    pub source_label: String,
    pub escape: EscapeDepth,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            docs_prefix: "claude".to_string(),
            section_label: "Claude".to_string(),
            source_label: "~/.claude".to_string(),
            escape: EscapeDepth::default(),
        }
    }
}

/// Output path of an item's page, relative to the output root
pub fn page_path(item: &SourceItem) -> String {
    match &item.detail {
        ItemDetail::Reference { skill, .. } => format!(
            "{}/{}/{}.{}",
            ItemKind::SkillReference.dir_name(),
            skill,
            item.identifier,
            PAGE_EXTENSION
        ),
        _ => format!(
            "{}/{}.{}",
            item.kind.dir_name(),
            item.identifier,
            PAGE_EXTENSION
        ),
    }
}

/// Page metadata block followed by the page heading and body sections
pub(crate) struct PageBuilder {
    meta: Vec<(&'static str, String)>,
    sections: Vec<String>,
}

impl PageBuilder {
    pub(crate) fn new() -> Self {
        Self {
            meta: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Metadata entry whose value is written as-is
    pub(crate) fn meta(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.meta.push((key, value.into()));
        self
    }

    /// Metadata entry written as a quoted string
    pub(crate) fn meta_quoted(self, key: &'static str, value: &str) -> Self {
        self.meta(key, yaml_quote(value))
    }

    /// Blank sections are dropped
    pub(crate) fn section(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.sections.push(text);
        }
        self
    }

    pub(crate) fn build(self) -> String {
        let mut out = String::from("---\n");
        for (key, value) in &self.meta {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out.push_str("---\n");
        for section in &self.sections {
            out.push('\n');
            out.push_str(section.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Turns source items into MDX pages
#[derive(Debug, Clone, Default)]
pub struct PageRenderer {
    options: RenderOptions,
}

impl PageRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Page content for one item; pure and deterministic
    pub fn render(&self, item: &SourceItem) -> String {
        let page = PageBuilder::new().meta_quoted("title", &item.title);
        let page = if item.description.is_empty() {
            page
        } else {
            page.meta_quoted("description", &item.description)
        };
        let page = page.section(format!("# {}", self.escape(&item.title)));

        let page = match &item.detail {
            ItemDetail::Instruction { relative_path } => page.section(format!(
                "**Path:** `{}/{}`",
                self.options.source_label, relative_path
            )),
            ItemDetail::Command => page,
            ItemDetail::Skill {
                references,
                resources,
            } => page.section(resources_callout(!references.is_empty(), *resources)),
            ItemDetail::Agent { model } => match model {
                Some(model) => page.section(format!("**Model:** `{model}`")),
                None => page,
            },
            ItemDetail::Reference { skill, skill_title } => page
                .section(format!(
                    "**Skill:** [{}](../{}.{})",
                    self.escape(skill_title),
                    skill,
                    PAGE_EXTENSION
                ))
                .section("---"),
        };

        let page = page.section(self.escape(item.body.trim()));

        let page = match &item.detail {
            ItemDetail::Skill { references, .. } if !references.is_empty() => {
                page.section(references_index(&item.identifier, references, self))
            }
            _ => page,
        };

        page.build()
    }

    /// The item's own page plus, for a skill, one page per reference
    pub fn pages(&self, item: &SourceItem) -> Vec<GeneratedPage> {
        let mut pages = vec![GeneratedPage::new(page_path(item), self.render(item))];
        for reference in item.references() {
            pages.push(GeneratedPage::new(
                page_path(reference),
                self.render(reference),
            ));
        }
        pages
    }

    pub(crate) fn escape(&self, text: &str) -> String {
        escape_mdx(text, self.options.escape)
    }
}

fn resources_callout(has_references: bool, resources: SkillResources) -> String {
    let mut bundled = Vec::new();
    if has_references {
        bundled.push("[references](#references)");
    }
    if resources.has_scripts {
        bundled.push("scripts");
    }
    if resources.has_assets {
        bundled.push("assets");
    }
    if bundled.is_empty() {
        return String::new();
    }
    format!(
        ":::info Bundled Resources\nThis skill includes: {}\n:::",
        bundled.join(", ")
    )
}

fn references_index(skill_id: &str, references: &[SourceItem], renderer: &PageRenderer) -> String {
    let mut out = String::from("## References\n");
    for reference in references {
        out.push_str(&format!(
            "\n- [{}](./{}/{}.{})",
            renderer.escape(&reference.title),
            skill_id,
            reference.identifier,
            PAGE_EXTENSION
        ));
    }
    out
}
