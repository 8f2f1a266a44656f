use anyhow::{Context, Result};
use claudedoc_devserver::{spawn_dev_server, ProjectLocator};
use claudedoc_site::SiteConfig;
use claudedoc_types::Event;
use claudedoc_watch::{DebounceScheduler, IgnoreFilter, SourceWatcher, WatchTargets};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cli::Command;
use crate::context::{regenerate, AppContext};

pub async fn run(ctx: &mut AppContext, command: Command) -> Result<()> {
    match command {
        Command::Generate => generate(ctx).await,
        Command::Watch => watch(ctx).await,
        Command::Dev => dev(ctx).await,
        Command::Serve { project } => serve(ctx, project.as_deref()).await,
    }
}

async fn generate(ctx: &AppContext) -> Result<()> {
    let report = ctx.regenerate().await?;
    info!(
        "{} pages written, {} unchanged, {} removed",
        report.pages.written.len(),
        report.pages.unchanged,
        report.pages.removed.len()
    );
    Ok(())
}

async fn watch(ctx: &AppContext) -> Result<()> {
    ctx.regenerate().await?;
    let session = WatchSession::start(ctx)?;

    signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Received Ctrl-C, shutting down");

    session.finish().await
}

/// Generate once, then run the site's dev server with the watcher beside it
async fn dev(ctx: &AppContext) -> Result<()> {
    ctx.regenerate().await?;

    let config = ctx.config();
    let mut server = spawn_dev_server(&config.server, &config.site.site_root())?;
    ctx.events().emit(&Event::ServerStarting {
        url: config.server.url(),
    });
    let session = WatchSession::start(ctx)?;

    let exited = tokio::select! {
        code = server.wait() => Some(code?),
        interrupted = signal::ctrl_c() => {
            interrupted.context("Failed to listen for Ctrl-C")?;
            None
        }
    };
    let code = match exited {
        Some(code) => code,
        None => {
            info!("Received Ctrl-C, stopping dev server");
            server.stop().await?
        }
    };
    ctx.events().emit(&Event::ServerStopped { code });

    session.finish().await?;
    if exited.is_some() && code != Some(0) {
        anyhow::bail!("Dev server exited with code {code:?}");
    }
    Ok(())
}

async fn serve(ctx: &mut AppContext, project: Option<&Path>) -> Result<()> {
    let site_root = ctx.config().site.site_root();
    let default_project = site_root
        .parent()
        .map_or_else(|| site_root.clone(), Path::to_path_buf);

    let project = ProjectLocator::for_user(default_project)
        .resolve(project)
        .context("Failed to locate the documentation project")?;

    ctx.start_server(&project).await?;
    info!("Press Ctrl-C to stop");
    ctx.serve_until_interrupted().await
}

/// Paths whose changes affect the generated docs
fn watch_targets(site: &SiteConfig) -> WatchTargets {
    let scanner = site.scanner();
    let files: Vec<PathBuf> = scanner
        .scan_instructions()
        .into_iter()
        .map(|item| item.source_path)
        .collect();
    WatchTargets {
        directories: vec![
            scanner.commands_dir(),
            scanner.skills_dir(),
            scanner.agents_dir(),
        ],
        files,
    }
}

/// Live watcher feeding a debounce scheduler
struct WatchSession {
    watcher: SourceWatcher,
    scheduler: JoinHandle<()>,
}

impl WatchSession {
    fn start(ctx: &AppContext) -> Result<Self> {
        let site = ctx.config().site.clone();
        let filter = IgnoreFilter::new(&site.source_root).exclude(site.site_root());

        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = SourceWatcher::start(&watch_targets(&site), filter, tx)?;

        let events = Arc::clone(ctx.events());
        let scheduler = DebounceScheduler::new(ctx.config().watch.debounce())
            .with_event_bus(Arc::clone(&events));
        info!(
            "Watching sources ({:?} debounce)",
            scheduler.window()
        );

        let scheduler = tokio::spawn(scheduler.run(rx, move || {
            let site = site.clone();
            let events = Arc::clone(&events);
            async move { regenerate(site, events).await.map(|_| ()) }
        }));

        Ok(Self { watcher, scheduler })
    }

    /// Stop watching and let an in-flight regeneration finish
    async fn finish(self) -> Result<()> {
        drop(self.watcher);
        self.scheduler
            .await
            .context("Watch scheduler panicked")
    }
}
