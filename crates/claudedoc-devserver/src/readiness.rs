//! HTTP HEAD readiness polling

use reqwest::{redirect, Client, StatusCode};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::{DevServerError, Result};

/// Polls a URL until it answers `200 OK`
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    client: Client,
    url: String,
    interval: Duration,
}

impl ReadinessProbe {
    /// Probe `url` every `interval`, giving each request `request_timeout`
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(url: impl Into<String>, request_timeout: Duration, interval: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .redirect(redirect::Policy::none())
            .no_proxy()
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            interval,
        })
    }

    /// Probe for the server described by `config`
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn for_server(config: &ServerConfig) -> Result<Self> {
        Self::new(config.url(), config.request_timeout(), config.poll_interval())
    }

    /// Probed URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// One HEAD request; any failure counts as not ready
    pub async fn is_ready(&self) -> bool {
        match self.client.head(&self.url).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!("Probe of {} failed: {}", self.url, e);
                false
            }
        }
    }

    /// Poll until ready or until `limit` has elapsed
    ///
    /// # Errors
    /// Returns [`DevServerError::StartupTimeout`] when the limit is reached
    pub async fn wait(&self, limit: Duration) -> Result<()> {
        timeout(limit, async {
            while !self.is_ready().await {
                sleep(self.interval).await;
            }
        })
        .await
        .map_err(|_| DevServerError::StartupTimeout {
            url: self.url.clone(),
            timeout: limit.as_secs(),
        })?;

        info!("Server is ready at {}", self.url);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal HTTP responder answering every request with `status`
    async fn responder(status: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    let response =
                        format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }

    async fn unused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    fn probe(url: String) -> ReadinessProbe {
        ReadinessProbe::new(url, Duration::from_millis(500), Duration::from_millis(50)).unwrap()
    }

    #[tokio::test]
    async fn test_ok_is_ready() {
        let probe = probe(responder("200 OK").await);
        assert!(probe.is_ready().await);
        probe.wait(Duration::from_secs(5)).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_200_is_not_ready() {
        let probe = probe(responder("404 Not Found").await);
        assert!(!probe.is_ready().await);
    }

    #[tokio::test]
    async fn test_wait_times_out_without_server() {
        let probe = probe(unused_url().await);
        let err = probe.wait(Duration::from_millis(300)).await.unwrap_err();
        assert!(matches!(err, DevServerError::StartupTimeout { .. }));
    }
}
