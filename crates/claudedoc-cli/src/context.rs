use anyhow::{Context, Result};
use chrono::Utc;
use claudedoc_devserver::StaticServer;
use claudedoc_site::{generate, GenerationReport, SiteConfig};
use claudedoc_types::{Event, EventBus};
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;

/// State shared by every command for the lifetime of the process
pub struct AppContext {
    config: AppConfig,
    events: Arc<EventBus>,
    server: Option<StaticServer>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let events = Arc::new(EventBus::new());
        events.subscribe(log_event);
        Self {
            config,
            events,
            server: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// One generation pass with lifecycle events
    pub async fn regenerate(&self) -> Result<GenerationReport> {
        regenerate(self.config.site.clone(), Arc::clone(&self.events)).await
    }

    /// Build and serve the site of `project`, returning once it answers
    pub async fn start_server(&mut self, project: &Path) -> Result<()> {
        let url = self.config.server.url();
        self.events.emit(&Event::ServerStarting { url: url.clone() });

        let server = StaticServer::start(&self.config.server, project)
            .await
            .context("Failed to start server")?;

        self.events.emit(&Event::ServerReady { url });
        self.server = Some(server);
        Ok(())
    }

    /// Block until Ctrl-C or until the server exits on its own
    pub async fn serve_until_interrupted(&mut self) -> Result<()> {
        let Some(server) = self.server.as_mut() else {
            return Ok(());
        };

        tokio::select! {
            code = server.wait() => {
                let code = code?;
                self.server = None;
                self.events.emit(&Event::ServerStopped { code });
                if code != Some(0) {
                    anyhow::bail!("Server exited with code {code:?}");
                }
            }
            interrupted = signal::ctrl_c() => {
                interrupted.context("Failed to listen for Ctrl-C")?;
                info!("Received Ctrl-C, shutting down");
            }
        }
        Ok(())
    }

    /// Stop the server if one is running
    pub async fn shutdown(&mut self) {
        let Some(server) = self.server.take() else {
            return;
        };
        match server.stop().await {
            Ok(code) => self.events.emit(&Event::ServerStopped { code }),
            Err(e) => warn!("Failed to stop server: {}", e),
        }
    }
}

/// Run the pipeline off the async runtime and publish its outcome
pub async fn regenerate(site: SiteConfig, events: Arc<EventBus>) -> Result<GenerationReport> {
    events.emit(&Event::RegenerationStarted { at: Utc::now() });

    let outcome = tokio::task::spawn_blocking(move || generate(&site))
        .await
        .context("Generation task panicked")?;

    match outcome {
        Ok(report) => {
            events.emit(&Event::RegenerationCompleted {
                summary: report.summary,
                written: report.pages.written.len(),
                removed: report.pages.removed.len(),
                at: Utc::now(),
            });
            Ok(report)
        }
        Err(e) => {
            events.emit(&Event::RegenerationFailed {
                message: e.to_string(),
                at: Utc::now(),
            });
            Err(e).context("Documentation generation failed")
        }
    }
}

fn log_event(event: &Event) {
    match event {
        Event::SourceChanged { path } => debug!("Source changed: {:?}", path),
        Event::RegenerationStarted { .. } => debug!("Regeneration started"),
        Event::RegenerationCompleted {
            written, removed, ..
        } => info!("Docs updated: {} written, {} removed", written, removed),
        Event::RegenerationFailed { message, .. } => error!("Regeneration failed: {}", message),
        Event::ServerStarting { url } => info!("Starting server for {}", url),
        Event::ServerReady { url } => info!("Docs available at {}", url),
        Event::ServerStopped { code } => info!("Server stopped (code {:?})", code),
    }
}
