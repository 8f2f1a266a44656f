//! Build-then-serve supervisor for the static site

use std::path::Path;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{DevServerError, Result};
use crate::process::{build_site, ServerProcess};
use crate::readiness::ReadinessProbe;

/// A built site being served on the configured port
#[derive(Debug)]
pub struct StaticServer {
    process: ServerProcess,
    url: String,
}

impl StaticServer {
    /// Build `project/site`, serve it and wait until it answers
    ///
    /// A server that never becomes ready is stopped before returning.
    ///
    /// # Errors
    /// Fails on a missing site, a failed build, an early exit of the server,
    /// or the start timeout
    pub async fn start(config: &ServerConfig, project: &Path) -> Result<Self> {
        let site_dir = project.join("site");
        if !site_dir.is_dir() {
            return Err(DevServerError::SiteNotFound(site_dir));
        }

        build_site(config, &site_dir).await?;

        info!("Starting static file server...");
        let mut process = ServerProcess::spawn(config, &site_dir, &config.serve_script(), "serve")?;
        let probe = ReadinessProbe::for_server(config)?;

        let outcome = tokio::select! {
            ready = probe.wait(config.start_timeout()) => ready,
            exited = process.wait() => Err(DevServerError::ServerExited { code: exited? }),
        };

        if let Err(e) = outcome {
            if let Err(stop) = process.stop().await {
                warn!("Failed to stop server after startup error: {}", stop);
            }
            return Err(e);
        }

        Ok(Self {
            process,
            url: config.url(),
        })
    }

    /// Address the site is served at
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Wait for the server to exit on its own
    ///
    /// # Errors
    /// Returns an I/O error if waiting fails
    pub async fn wait(&mut self) -> Result<Option<i32>> {
        self.process.wait().await
    }

    /// Stop the server and its children
    ///
    /// # Errors
    /// Returns an I/O error if the process cannot be killed or reaped
    pub async fn stop(self) -> Result<Option<i32>> {
        self.process.stop().await
    }
}
