//! Child processes run through the user's shell

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{DevServerError, Result};

/// How long a stopped process gets to exit before it is killed
const STOP_GRACE: Duration = Duration::from_secs(5);

/// A running child with its output forwarded to the log
#[derive(Debug)]
pub struct ServerProcess {
    child: Child,
    label: &'static str,
}

impl ServerProcess {
    /// Run `script` with `$SHELL -c` inside `dir`
    ///
    /// Each output line is logged prefixed with `[label]`. On Unix the child
    /// leads its own process group so stopping it also stops its children.
    ///
    /// # Errors
    /// Returns [`DevServerError::Spawn`] if the shell cannot be started
    pub fn spawn(config: &ServerConfig, dir: &Path, script: &str, label: &'static str) -> Result<Self> {
        let shell = config.shell();
        debug!("Spawning [{}] {} -c {:?} in {:?}", label, shell, script, dir);

        let mut cmd = Command::new(&shell);
        cmd.arg("-c")
            .arg(script)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = config.search_path() {
            cmd.env("PATH", path);
        }
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| DevServerError::Spawn {
            command: script.to_string(),
            source,
        })?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, label, false));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, label, true));
        }

        Ok(Self { child, label })
    }

    /// OS process id, `None` once the process has been reaped
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the process to exit and return its exit code
    ///
    /// # Errors
    /// Returns an I/O error if waiting fails
    pub async fn wait(&mut self) -> Result<Option<i32>> {
        let status = self.child.wait().await?;
        info!("[{}] exited with code {:?}", self.label, status.code());
        Ok(status.code())
    }

    /// Ask the process to terminate, killing it if it does not exit in time
    ///
    /// # Errors
    /// Returns an I/O error if the process cannot be killed or reaped
    pub async fn stop(mut self) -> Result<Option<i32>> {
        info!("Stopping [{}]...", self.label);
        terminate(&mut self.child).await;

        let status = match timeout(STOP_GRACE, self.child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                warn!("[{}] did not exit after {:?}, killing", self.label, STOP_GRACE);
                self.child.kill().await?;
                self.child.wait().await?
            }
        };
        Ok(status.code())
    }
}

/// Build the static site in `site_dir`
///
/// # Errors
/// Fails when the build exits non-zero or leaves no `build/` directory
pub async fn build_site(config: &ServerConfig, site_dir: &Path) -> Result<()> {
    info!("Building site in {:?}...", site_dir);
    let mut build = ServerProcess::spawn(config, site_dir, &config.build_script(), "build")?;
    let code = build.wait().await?;
    if code != Some(0) {
        return Err(DevServerError::BuildFailed { code });
    }

    let output = site_dir.join("build");
    if !output.is_dir() {
        return Err(DevServerError::MissingBuildOutput(output));
    }
    info!("Build completed successfully");
    Ok(())
}

/// Start the hot-reloading dev server in `site_dir`
///
/// # Errors
/// Returns [`DevServerError::Spawn`] if the shell cannot be started
pub fn spawn_dev_server(config: &ServerConfig, site_dir: &Path) -> Result<ServerProcess> {
    info!("Starting dev server at {}", config.url());
    ServerProcess::spawn(config, site_dir, &config.dev_script(), "dev")
}

async fn forward_lines<R>(stream: R, label: &'static str, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {}
            Ok(Some(line)) if is_stderr => warn!("[{}] {}", label, line.trim_end()),
            Ok(Some(line)) => info!("[{}] {}", label, line.trim_end()),
            Ok(None) => break,
            Err(e) => {
                debug!("[{}] output closed: {}", label, e);
                break;
            }
        }
    }
}

/// SIGTERM the whole process group led by `child`
#[cfg(unix)]
async fn terminate(child: &mut Child) {
    let Some(pid) = child.id() else {
        return;
    };
    let group = format!("-{pid}");
    match Command::new("kill")
        .args(["-TERM", "--", group.as_str()])
        .status()
        .await
    {
        Ok(status) if status.success() => {}
        Ok(_) | Err(_) => {
            debug!("Group signal failed for {}, signalling the process", pid);
            if let Err(e) = child.start_kill() {
                debug!("Process {} already gone: {}", pid, e);
            }
        }
    }
}

#[cfg(not(unix))]
async fn terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        debug!("Process already gone: {}", e);
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn sh_config(package_manager: &str) -> ServerConfig {
        ServerConfig {
            shell: Some("/bin/sh".to_string()),
            package_manager: package_manager.to_string(),
            extra_path: Vec::<PathBuf>::new(),
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_wait_reports_exit_code() {
        let dir = tempdir().unwrap();
        let mut process =
            ServerProcess::spawn(&sh_config("pnpm"), dir.path(), "echo hi; exit 3", "test").unwrap();
        assert_eq!(process.wait().await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_failed_build() {
        let dir = tempdir().unwrap();
        let err = build_site(&sh_config("false"), dir.path()).await.unwrap_err();
        assert!(matches!(err, DevServerError::BuildFailed { code: Some(1) }));
    }

    #[tokio::test]
    async fn test_build_without_output_directory() {
        let dir = tempdir().unwrap();
        let err = build_site(&sh_config("true"), dir.path()).await.unwrap_err();
        assert!(matches!(err, DevServerError::MissingBuildOutput(_)));

        std::fs::create_dir(dir.path().join("build")).unwrap();
        build_site(&sh_config("true"), dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_terminates_long_running_child() {
        let dir = tempdir().unwrap();
        let process =
            ServerProcess::spawn(&sh_config("pnpm"), dir.path(), "sleep 30", "test").unwrap();
        assert!(process.id().is_some());

        let started = std::time::Instant::now();
        let code = process.stop().await.unwrap();
        assert_eq!(code, None);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
