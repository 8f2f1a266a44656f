//! ClaudeDoc content scanner
//!
//! Walks a Claude Code configuration tree and builds an in-memory
//! [`Inventory`](claudedoc_types::Inventory) of everything worth documenting.
//!
//! ## Layout
//!
//! - `CLAUDE.md` instruction files anywhere below the source root
//! - `commands/*.md` slash commands
//! - `skills/<name>/SKILL.md` skill packages, with optional `references/*.md`,
//!   `scripts/` and `assets/`
//! - `agents/*.md` subagent definitions
//!
//! Missing directories yield no items. Malformed front matter in a command
//! aborts the pass; in a skill or agent it skips that one item.

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod error;
pub mod frontmatter;
pub mod scanner;
pub mod skill;

pub use error::{Result, ScanError};
pub use frontmatter::{first_heading, parse_document, FrontMatter, ParsedDocument};
pub use scanner::ContentScanner;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{ContentScanner, Result, ScanError};
}
