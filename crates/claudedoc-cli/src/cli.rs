use clap::{Parser, Subcommand};
use claudedoc_site::EscapeDepth;
use std::path::PathBuf;

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(
    name = "claudedoc",
    about = "Generate a documentation site from a Claude Code configuration tree",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Claude Code configuration root (default: ~/.claude)
    #[arg(long, global = true, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Documentation site root (default: <source>/doc/site)
    #[arg(long, global = true, value_name = "DIR")]
    pub site: Option<PathBuf>,

    /// Doc id prefix and output directory name under docs/
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Label of the top-level section
    #[arg(long, global = true)]
    pub label: Option<String>,

    /// How much of page bodies to escape: markup or strict
    #[arg(long, global = true, value_parser = clap::value_parser!(EscapeDepth))]
    pub escape: Option<EscapeDepth>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "CLAUDEDOC_LOG")]
    pub log_level: Option<String>,

    /// Config file used instead of ./claudedoc.toml
    #[arg(long, global = true, value_name = "FILE", env = "CLAUDEDOC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Default, PartialEq, Eq)]
pub enum Command {
    /// Generate the documentation once (default)
    #[default]
    Generate,

    /// Generate, then regenerate whenever sources change
    Watch,

    /// Generate, run the hot-reloading site dev server and watch sources
    Dev,

    /// Build the site and serve it locally until interrupted
    Serve {
        /// Project directory containing site/; remembered for later runs
        #[arg(long, value_name = "DIR")]
        project: Option<PathBuf>,
    },
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config.clone(),
            source: self.source.clone(),
            site: self.site.clone(),
            prefix: self.prefix.clone(),
            label: self.label.clone(),
            escape: self.escape,
            log_level: self.log_level.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_default() {
        let cli = Cli::try_parse_from(["claudedoc", "--prefix", "cc"]).unwrap();
        assert_eq!(cli.command.clone().unwrap_or_default(), Command::Generate);
        assert_eq!(cli.overrides().prefix.as_deref(), Some("cc"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "claudedoc",
            "serve",
            "--project",
            "/srv/doc",
            "--escape",
            "markup",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Serve {
                project: Some(PathBuf::from("/srv/doc"))
            })
        );
        assert_eq!(cli.escape, Some(EscapeDepth::Markup));
    }

    #[test]
    fn test_unknown_escape_rejected() {
        let err = Cli::try_parse_from(["claudedoc", "--escape", "html"]).unwrap_err();
        assert!(err.to_string().contains("expected 'markup' or 'strict'"));

        let cli = Cli::try_parse_from(["claudedoc", "--escape", "Strict"]).unwrap();
        assert_eq!(cli.overrides().escape, Some(EscapeDepth::Strict));
    }
}
