//! Which filesystem events are noise

use std::path::{Path, PathBuf};

/// Directory names whose contents never trigger regeneration
const IGNORED_NAMES: &[&str] = &["node_modules", "build", ".docusaurus", ".cache"];

/// Decides whether a changed path should be ignored
///
/// Hidden entries (dotfiles and dot-directories), dependency caches, build
/// output and anything under an excluded prefix are ignored. Only the part
/// of the path below `base` is inspected, so a hidden source root such as
/// `~/.claude` does not hide itself.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    base: PathBuf,
    excluded: Vec<PathBuf>,
}

impl IgnoreFilter {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            excluded: Vec::new(),
        }
    }

    /// Ignore everything under `prefix`, e.g. the generator's own output
    pub fn exclude(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.excluded.push(prefix.into());
        self
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        if self.excluded.iter().any(|prefix| path.starts_with(prefix)) {
            return true;
        }

        let relative = path.strip_prefix(&self.base).unwrap_or(path);
        relative.components().any(|component| {
            let name = component.as_os_str().to_string_lossy();
            (name.starts_with('.') && name != "." && name != "..")
                || IGNORED_NAMES.contains(&name.as_ref())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> IgnoreFilter {
        IgnoreFilter::new("/home/me/.claude").exclude("/home/me/.claude/doc/site")
    }

    #[test]
    fn test_source_changes_pass() {
        let filter = filter();
        assert!(!filter.is_ignored(Path::new("/home/me/.claude/commands/foo.md")));
        assert!(!filter.is_ignored(Path::new("/home/me/.claude/skills/pdf/SKILL.md")));
        assert!(!filter.is_ignored(Path::new("/home/me/.claude/CLAUDE.md")));
    }

    #[test]
    fn test_noise_is_ignored() {
        let filter = filter();
        assert!(filter.is_ignored(Path::new("/home/me/.claude/commands/.foo.md.swp")));
        assert!(filter.is_ignored(Path::new("/home/me/.claude/skills/x/node_modules/a.js")));
        assert!(filter.is_ignored(Path::new("/home/me/.claude/skills/x/build/out.md")));
        assert!(filter.is_ignored(Path::new("/home/me/.claude/.git/HEAD")));
        assert!(filter.is_ignored(Path::new("/home/me/.claude/doc/site/docs/claude/index.mdx")));
    }
}
