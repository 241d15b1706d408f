//! Release-feed artifact acquisition

use crate::config::FeedConfig;
use crate::errors::{FetchError, InstallationResult};
use crate::http::HttpFetcher;
use crate::logging::InstallLog;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Release asset as listed by the feed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// "Latest release" API response, reduced to what the installer reads
#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    tag_name: Option<String>,
    #[serde(default)]
    assets: Vec<ReleaseAsset>,
}

/// First asset whose name ends with `extension`, in feed order
pub fn select_asset<'a>(assets: &'a [ReleaseAsset], extension: &str) -> Option<&'a ReleaseAsset> {
    assets.iter().find(|asset| asset.name.ends_with(extension))
}

/// Queries the release feed and downloads the newest matching artifact
pub struct ArtifactFetcher<'a> {
    http: &'a dyn HttpFetcher,
    feed: &'a FeedConfig,
}

impl<'a> ArtifactFetcher<'a> {
    pub fn new(http: &'a dyn HttpFetcher, feed: &'a FeedConfig) -> Self {
        Self { http, feed }
    }

    /// Download the latest matching artifact into `output_dir`, returning its path
    pub async fn fetch(&self, output_dir: &Path, log: &InstallLog) -> InstallationResult<PathBuf> {
        log.stage_banner("Open WebUI Download Module");
        std::fs::create_dir_all(output_dir)?;

        let asset = self.latest_asset(log).await?;
        log.info(format!("Found artifact: {}", asset.name));
        log.info(format!("Download URL: {}", asset.download_url));

        let output_path = output_dir.join(file_name_of(&asset.name));
        log.info(format!("Downloading artifact to: {}", output_path.display()));

        let response = self
            .http
            .download(&asset.download_url, &output_path)
            .await
            .map_err(|e| FetchError::DownloadFailed {
                url: asset.download_url.clone(),
                reason: e.to_string(),
            })?;
        if response.status != 200 {
            log.info(format!("Failed to download artifact. Status code: {}", response.status));
            return Err(FetchError::DownloadFailed {
                url: asset.download_url,
                reason: format!("status code {}", response.status),
            }
            .into());
        }

        let size = std::fs::metadata(&output_path)?.len();
        log.info(format!("Downloaded file size: {} bytes", size));
        if size < self.feed.min_artifact_bytes {
            log.error("Downloaded file is too small, likely not a valid artifact");
            return Err(FetchError::FileTooSmall {
                size,
                minimum: self.feed.min_artifact_bytes,
            }
            .into());
        }

        log.info(format!("Successfully downloaded artifact to: {}", output_path.display()));
        Ok(output_path)
    }

    async fn latest_asset(&self, log: &InstallLog) -> InstallationResult<ReleaseAsset> {
        log.info(format!("Fetching latest release information from: {}", self.feed.url));

        let response = self
            .http
            .get_text(&self.feed.url)
            .await
            .map_err(|e| FetchError::FeedUnreachable {
                url: self.feed.url.clone(),
                reason: e.to_string(),
            })?;

        if response.status != 200 {
            log.info(format!(
                "Failed to fetch release information. Status code: {}",
                response.status
            ));
            match serde_json::from_str::<serde_json::Value>(&response.body) {
                Ok(details) => log.info(format!(
                    "Error details: {}",
                    serde_json::to_string_pretty(&details).unwrap_or_else(|_| details.to_string())
                )),
                Err(_) => log.info(format!("Response content: {}", response.body)),
            }
            return Err(FetchError::FeedStatus {
                status: response.status,
            }
            .into());
        }

        let release: Release =
            serde_json::from_str(&response.body).map_err(|e| FetchError::MalformedFeed {
                reason: e.to_string(),
            })?;
        if let Some(tag) = &release.tag_name {
            log.info(format!("Latest release: {}", tag));
        }

        match select_asset(&release.assets, &self.feed.asset_extension) {
            Some(asset) => Ok(asset.clone()),
            None => {
                log.info(format!(
                    "No {} file found in the latest release assets",
                    self.feed.asset_extension
                ));
                Err(FetchError::NoMatchingAsset {
                    extension: self.feed.asset_extension.clone(),
                }
                .into())
            }
        }
    }
}

/// Last path component of an asset name, so a feed cannot write outside the output dir
fn file_name_of(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
