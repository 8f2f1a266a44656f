//! Configuration for the site toolchain and the local server

use serde::Deserialize;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Local server configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Hostname alias the static server binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// Fixed local port
    #[serde(default = "default_port")]
    pub port: u16,

    /// How long to wait for the server to answer, in seconds
    #[serde(default = "default_start_timeout")]
    pub start_timeout_secs: u64,

    /// Delay between readiness probes, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Timeout of a single readiness probe, in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Package manager used to run the site scripts
    #[serde(default = "default_package_manager")]
    pub package_manager: String,

    /// Shell used to run child processes; `$SHELL` when unset
    #[serde(default)]
    pub shell: Option<String>,

    /// Directories prepended to `PATH` for child processes
    #[serde(default = "default_extra_path")]
    pub extra_path: Vec<PathBuf>,
}

fn default_host() -> String {
    "claude.localhost".to_string()
}

fn default_port() -> u16 {
    9987
}

fn default_start_timeout() -> u64 {
    60
}

fn default_poll_interval() -> u64 {
    500
}

fn default_request_timeout() -> u64 {
    1000
}

fn default_package_manager() -> String {
    "pnpm".to_string()
}

/// Common package manager install locations
fn default_extra_path() -> Vec<PathBuf> {
    let mut entries = vec![
        PathBuf::from("/opt/homebrew/bin"),
        PathBuf::from("/usr/local/bin"),
    ];
    if let Some(home) = dirs::home_dir() {
        entries.extend(
            [
                ".anyenv/envs/nodenv/shims",
                ".nodenv/shims",
                ".nvm/versions/node",
                ".volta/bin",
                "Library/pnpm",
                ".local/share/pnpm",
            ]
            .iter()
            .map(|rel| home.join(rel)),
        );
    }
    entries
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            start_timeout_secs: default_start_timeout(),
            poll_interval_ms: default_poll_interval(),
            request_timeout_ms: default_request_timeout(),
            package_manager: default_package_manager(),
            shell: None,
            extra_path: default_extra_path(),
        }
    }
}

impl ServerConfig {
    /// Address the site is reachable at
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Start timeout as a [`Duration`]
    #[must_use]
    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_secs)
    }

    /// Poll interval as a [`Duration`]
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Per-probe timeout as a [`Duration`]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Shell program for child processes
    #[must_use]
    pub fn shell(&self) -> String {
        self.shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| "/bin/bash".to_string())
    }

    /// `PATH` for child processes: extra entries first, then the inherited value
    #[must_use]
    pub fn search_path(&self) -> Option<OsString> {
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let entries = self
            .extra_path
            .iter()
            .cloned()
            .chain(std::env::split_paths(&inherited));
        match std::env::join_paths(entries) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Ignoring extra PATH entries: {}", e);
                None
            }
        }
    }

    /// Script that builds the static site
    #[must_use]
    pub fn build_script(&self) -> String {
        format!("exec {} run build", self.package_manager)
    }

    /// Script that serves the built site
    #[must_use]
    pub fn serve_script(&self) -> String {
        format!(
            "exec {} exec docusaurus serve --port {} --host {} --no-open",
            self.package_manager, self.port, self.host
        )
    }

    /// Script that runs the hot-reloading dev server
    #[must_use]
    pub fn dev_script(&self) -> String {
        format!(
            "exec {} exec docusaurus start --port {} --host {} --no-open",
            self.package_manager, self.port, self.host
        )
    }
}
