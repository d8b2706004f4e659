//! Release asset download

#[cfg(test)]
use mockall::automock;

use std::path::Path;

use tracing::debug;

use crate::version::error::DownloadError;
use crate::version::extract::{ArchiveKind, extract_archive};

/// Trait for fetching a release archive and unpacking it
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// Downloads `url` and extracts it into `dest`
    ///
    /// # Arguments
    /// * `url` - Full asset URL
    /// * `kind` - Archive format of the asset
    /// * `dest` - Directory that receives the extracted files
    async fn download_and_extract(
        &self,
        url: &str,
        kind: ArchiveKind,
        dest: &Path,
    ) -> Result<(), DownloadError>;
}

/// Downloads assets over HTTP with reqwest
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("setup-coolify/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Downloader for HttpDownloader {
    async fn download_and_extract(
        &self,
        url: &str,
        kind: ArchiveKind,
        dest: &Path,
    ) -> Result<(), DownloadError> {
        debug!("Downloading {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let data = response.bytes().await?;
        debug!("Downloaded {} bytes from {}", data.len(), url);

        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || extract_archive(&data, kind, &dest))
            .await
            .map_err(|e| DownloadError::Extract(format!("Extraction task failed: {}", e)))?
    }
}
