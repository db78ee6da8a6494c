//! HTTP download client
//!
//! Thin wrapper around reqwest with a configurable timeout and User-Agent.
//! Downloads are single attempts; any non-success status aborts the run.

use crate::error::{BuildError, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("webmin-buildsrc/", env!("CARGO_PKG_VERSION"));

/// Something that can fetch a URL into a local file
#[async_trait]
pub trait ArtifactSource {
    /// Download `url` and write the body to `dest`
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// HTTP client used for release archives and signatures
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                BuildError::environment(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Create a client with the default User-Agent and a custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::with_config(timeout, DEFAULT_USER_AGENT)
    }

    /// Fetch a URL and return the body
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BuildError::transport(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BuildError::transport(url, format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BuildError::transport(url, e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ArtifactSource for HttpClient {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        debug!("GET {}", url);
        let body = self.get_bytes(url).await?;
        std::fs::write(dest, body).map_err(|e| BuildError::io(dest, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_http_client_with_config() {
        let client = HttpClient::with_config(Duration::from_secs(60), "test-agent/1.0");
        assert!(client.is_ok());
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
        assert!(DEFAULT_USER_AGENT.starts_with("webmin-buildsrc/"));
    }

    #[tokio::test]
    async fn test_unreachable_url_names_url() {
        let client = HttpClient::with_timeout(Duration::from_secs(2)).unwrap();
        let temp_dir = tempfile::tempdir().unwrap();
        let url = "http://127.0.0.1:9/webmin-2.105.tar.gz";
        let err = client
            .download(url, &temp_dir.path().join("webmin-2.105.tar.gz"))
            .await
            .unwrap_err();
        assert!(format!("{}", err).contains(url));
    }
}
