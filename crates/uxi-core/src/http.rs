//! HTTP access for the release feed and downloads

use crate::config::FeedConfig;
use crate::errors::{InstallationResult, InstallerError};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Status and body of a text/JSON request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    pub status: u16,
    pub body: String,
}

/// Outcome of a download request.
///
/// The body is only written to disk when the server answered 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadResponse {
    pub status: u16,
    pub bytes_written: u64,
}

/// Performs HTTP GET requests
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// GET `url` and return the status and body text.
    /// Transport failures (DNS, connect, timeout) are `Err`.
    async fn get_text(&self, url: &str) -> InstallationResult<TextResponse>;

    /// GET `url`, streaming the body into `dest` when the status is 200
    async fn download(&self, url: &str, dest: &Path) -> InstallationResult<DownloadResponse>;
}

/// [`HttpFetcher`] implementation on top of reqwest
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
    api_timeout: Duration,
    download_timeout: Duration,
}

impl ReqwestFetcher {
    pub fn new(feed: &FeedConfig) -> InstallationResult<Self> {
        let client = Client::builder()
            .user_agent(feed.user_agent.clone())
            .connect_timeout(Duration::from_secs(feed.api_timeout_secs))
            .build()
            .map_err(|e| InstallerError::Network {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_timeout: Duration::from_secs(feed.api_timeout_secs),
            download_timeout: Duration::from_secs(feed.download_timeout_secs),
        })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get_text(&self, url: &str) -> InstallationResult<TextResponse> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .timeout(self.api_timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TextResponse { status, body })
    }

    async fn download(&self, url: &str, dest: &Path) -> InstallationResult<DownloadResponse> {
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            return Ok(DownloadResponse {
                status,
                bytes_written: 0,
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut bytes_written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        file.flush().await?;

        log::debug!("Downloaded {} bytes from {} to {}", bytes_written, url, dest.display());
        Ok(DownloadResponse {
            status,
            bytes_written,
        })
    }
}
