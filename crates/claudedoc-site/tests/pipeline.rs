#![allow(clippy::unwrap_used)]

use claudedoc_site::{generate, SiteConfig, SiteError};
use claudedoc_types::{NavigationNode, RegenerationSummary};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;
use walkdir::WalkDir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

struct Fixture {
    _temp: TempDir,
    source: PathBuf,
    config: SiteConfig,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("claude");
        write(&source.join("CLAUDE.md"), "# Global\n\nPrefer <small> diffs.\n");
        write(&source.join("projects/app/CLAUDE.md"), "# App rules\n");
        write(
            &source.join("commands/foo.md"),
            "---\ndescription: Does foo\n---\nRun foo with {args}.\n",
        );
        write(
            &source.join("commands/bar.md"),
            "---\ndescription: Does bar\n---\nRun bar.\n",
        );
        write(
            &source.join("skills/pdf/SKILL.md"),
            "---\nname: pdf\ndescription: Work with PDFs\n---\n# PDF\n",
        );
        write(
            &source.join("skills/pdf/references/forms.md"),
            "# Filling Forms\n\nUse `<input>` fields.\n",
        );

        let config = SiteConfig {
            site_root: Some(temp.path().join("site")),
            ..SiteConfig::for_source(&source)
        };
        Self {
            _temp: temp,
            source,
            config,
        }
    }

    fn output(&self, rel: &str) -> PathBuf {
        self.config.output_root().join(rel)
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.output(rel)).unwrap()
    }

    fn navigation(&self) -> Vec<NavigationNode> {
        let text = fs::read_to_string(self.config.navigation_file()).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    fn snapshot(&self) -> BTreeMap<PathBuf, (String, SystemTime)> {
        WalkDir::new(self.config.site_root())
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let meta = e.metadata().unwrap();
                (
                    e.path().to_path_buf(),
                    (
                        fs::read_to_string(e.path()).unwrap(),
                        meta.modified().unwrap(),
                    ),
                )
            })
            .collect()
    }
}

#[test]
fn test_end_to_end_scenario() {
    let fixture = Fixture::new();
    let report = generate(&fixture.config).unwrap();

    assert_eq!(
        report.summary,
        RegenerationSummary {
            instructions: 2,
            commands: 2,
            skills: 1,
            agents: 0,
        }
    );
    assert!(report.navigation_written);
    assert!(report.titles_written);

    let root = fixture.read("index.mdx");
    assert!(root.contains("| [CLAUDE.md](./claudemd/index.mdx) | 2 |"));
    assert!(root.contains("| [Commands](./commands/index.mdx) | 2 |"));
    assert!(root.contains("| [Skills](./skills/index.mdx) | 1 |"));
    assert!(root.contains("| Agents | 0 |"));

    let commands = fixture.read("commands/index.mdx");
    let bar = commands.find("[`/bar`]").unwrap();
    let foo = commands.find("[`/foo`]").unwrap();
    assert!(bar < foo);
    assert!(commands.contains("- [`/foo`](./foo.mdx) - Does foo"));

    assert!(fixture.read("commands/foo.mdx").contains("Run foo with &#123;args&#125;."));
    assert!(fixture.read("claudemd/root.mdx").contains("Prefer <small> diffs."));
    assert!(fixture.output("claudemd/projects--app.mdx").is_file());

    let skill = fixture.read("skills/pdf.mdx");
    assert!(skill.contains("- [Filling Forms](./pdf/forms.mdx)"));
    assert!(fixture.read("skills/pdf/forms.mdx").contains("Use `<input>` fields."));
    assert!(!fixture.output("agents").exists());

    let navigation = fixture.navigation();
    let labels: Vec<_> = navigation
        .iter()
        .filter_map(|node| match node {
            NavigationNode::Category(category) => Some(category.label.as_str()),
            NavigationNode::Doc(_) => None,
        })
        .collect();
    assert_eq!(labels, vec!["CLAUDE.md", "Commands", "Skills"]);
    assert_eq!(navigation[0], NavigationNode::doc("claude/index"));

    let titles: BTreeMap<String, String> =
        serde_json::from_str(&fs::read_to_string(fixture.config.titles_file()).unwrap()).unwrap();
    assert_eq!(titles.get("claude").map(String::as_str), Some("Claude"));
    assert_eq!(
        titles.get("claude/commands/foo").map(String::as_str),
        Some("/foo")
    );
}

#[test]
fn test_every_navigation_leaf_exists() {
    let fixture = Fixture::new();
    generate(&fixture.config).unwrap();

    for node in fixture.navigation() {
        for id in node.doc_ids() {
            let rel = id.strip_prefix("claude/").unwrap();
            assert!(
                fixture.output(&format!("{rel}.mdx")).is_file(),
                "missing page for {id}"
            );
        }
    }
}

#[test]
fn test_second_run_rewrites_nothing() {
    let fixture = Fixture::new();
    generate(&fixture.config).unwrap();
    let before = fixture.snapshot();

    let report = generate(&fixture.config).unwrap();
    assert!(report.pages.written.is_empty());
    assert!(report.pages.removed.is_empty());
    assert!(!report.navigation_written);
    assert!(!report.titles_written);
    assert_eq!(fixture.snapshot(), before);
}

#[test]
fn test_removed_source_removes_page() {
    let fixture = Fixture::new();
    generate(&fixture.config).unwrap();
    assert!(fixture.output("commands/bar.mdx").is_file());

    fs::remove_file(fixture.source.join("commands/bar.md")).unwrap();
    let report = generate(&fixture.config).unwrap();

    assert!(fixture.output("commands/foo.mdx").is_file());
    assert!(!fixture.output("commands/bar.mdx").exists());
    assert_eq!(report.pages.removed, vec![PathBuf::from("commands/bar.mdx")]);

    let files: Vec<_> = fs::read_dir(fixture.output("commands"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    assert_eq!(files, vec!["foo.mdx", "index.mdx"]);
}

#[test]
fn test_malformed_command_aborts_and_keeps_output() {
    let fixture = Fixture::new();
    generate(&fixture.config).unwrap();
    let before = fixture.read("commands/foo.mdx");

    write(
        &fixture.source.join("commands/broken.md"),
        "---\ndescription: [unclosed\n---\n",
    );
    let err = generate(&fixture.config).unwrap_err();
    assert!(matches!(err, SiteError::Scan(_)));
    assert_eq!(fixture.read("commands/foo.mdx"), before);
}

#[test]
fn test_hand_written_category_file_survives() {
    let fixture = Fixture::new();
    generate(&fixture.config).unwrap();
    write(&fixture.output("commands/_category_.json"), "{\"label\":\"Cmds\"}");

    generate(&fixture.config).unwrap();
    assert!(fixture.output("commands/_category_.json").is_file());
}

#[test]
fn test_empty_prefix_is_rejected_and_docs_survive() {
    let fixture = Fixture::new();
    let docs = fixture.config.docs_root();
    write(&docs.join("intro.md"), "# Intro\n");
    write(&docs.join("guides/setup.md"), "# Setup\n");

    for prefix in ["", "..", "a/b"] {
        let config = SiteConfig {
            docs_prefix: prefix.into(),
            ..fixture.config.clone()
        };
        let err = generate(&config).unwrap_err();
        assert!(matches!(err, SiteError::InvalidPrefix(_)), "{prefix:?}: {err}");
    }

    assert!(docs.join("intro.md").is_file());
    assert!(docs.join("guides/setup.md").is_file());
    assert!(!fixture.config.navigation_file().exists());
}

#[test]
fn test_command_named_index_keeps_listing_and_converges() {
    let fixture = Fixture::new();
    write(&fixture.source.join("commands/index.md"), "Shadows the listing.\n");

    let first = generate(&fixture.config).unwrap();
    assert_eq!(first.summary.commands, 2);
    let listing = fixture.read("commands/index.mdx");
    assert!(listing.contains("[`/foo`](./foo.mdx)"));
    assert!(!listing.contains("Shadows the listing."));

    let second = generate(&fixture.config).unwrap();
    assert!(second.pages.written.is_empty(), "{:?}", second.pages.written);
    assert!(second.pages.removed.is_empty());
}
