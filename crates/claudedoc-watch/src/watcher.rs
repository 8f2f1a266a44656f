//! Bridge from `notify` callbacks to a tokio channel

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::ignore::IgnoreFilter;

/// What to watch
#[derive(Debug, Clone, Default)]
pub struct WatchTargets {
    /// Directories watched with all their descendants
    pub directories: Vec<PathBuf>,
    /// Individual files, such as instruction files outside those directories
    pub files: Vec<PathBuf>,
}

/// Live filesystem watch; dropping it stops delivery
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    watched: Vec<PathBuf>,
}

impl SourceWatcher {
    /// Start watching `targets`, sending every relevant changed path to `changes`
    ///
    /// Targets that do not exist are skipped.
    pub fn start(
        targets: &WatchTargets,
        filter: IgnoreFilter,
        changes: UnboundedSender<PathBuf>,
    ) -> Result<Self> {
        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| match result {
                Ok(event) => forward(event, &filter, &changes),
                Err(e) => warn!("Filesystem watch error: {}", e),
            },
            Config::default(),
        )
        .context("Failed to create filesystem watcher")?;

        let mut watched = Vec::new();
        let all = targets
            .directories
            .iter()
            .map(|p| (p, RecursiveMode::Recursive))
            .chain(targets.files.iter().map(|p| (p, RecursiveMode::NonRecursive)));

        for (path, mode) in all {
            if !path.exists() {
                info!("Skipping {:?} (not found)", path);
                continue;
            }
            watcher
                .watch(path, mode)
                .with_context(|| format!("Failed to watch {}", path.display()))?;
            info!("Watching {:?}", path);
            watched.push(path.clone());
        }

        Ok(Self {
            _watcher: watcher,
            watched,
        })
    }

    /// Paths actually being watched
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }
}

impl std::fmt::Debug for SourceWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceWatcher")
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

fn forward(event: Event, filter: &IgnoreFilter, changes: &UnboundedSender<PathBuf>) {
    if matches!(event.kind, EventKind::Access(_)) {
        return;
    }

    for path in event.paths {
        if filter.is_ignored(&path) {
            continue;
        }
        debug!("Change observed: {:?} {:?}", event.kind, path);
        if changes.send(path).is_err() {
            error!("Tried to send filesystem change to a closed channel");
            return;
        }
    }
}
