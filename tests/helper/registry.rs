//! Registry and downloader test doubles

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use setup_coolify::config::Repository;
use setup_coolify::version::download::Downloader;
use setup_coolify::version::error::{DownloadError, RegistryError};
use setup_coolify::version::extract::ArchiveKind;
use setup_coolify::version::registry::ReleaseRegistry;

/// Registry returning canned answers
pub struct MockRegistry {
    latest: Option<String>,
    recent: Option<Vec<String>>,
    calls: Mutex<usize>,
}

impl MockRegistry {
    /// Registry where every lookup fails
    pub fn unreachable() -> Self {
        Self {
            latest: None,
            recent: None,
            calls: Mutex::new(0),
        }
    }

    pub fn with_latest(mut self, version: &str) -> Self {
        self.latest = Some(version.to_string());
        self
    }

    pub fn with_recent(mut self, versions: Vec<&str>) -> Self {
        self.recent = Some(versions.into_iter().map(|v| v.to_string()).collect());
        self
    }

    /// Number of lookups made so far
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ReleaseRegistry for MockRegistry {
    async fn fetch_latest_release(&self, repository: &Repository) -> Result<String, RegistryError> {
        *self.calls.lock().unwrap() += 1;
        self.latest
            .clone()
            .ok_or_else(|| RegistryError::NotFound(repository.to_string()))
    }

    async fn fetch_recent_releases(
        &self,
        _repository: &Repository,
        count: u8,
    ) -> Result<Vec<String>, RegistryError> {
        *self.calls.lock().unwrap() += 1;
        self.recent
            .clone()
            .map(|versions| versions.into_iter().take(usize::from(count)).collect())
            .ok_or(RegistryError::RateLimited {
                retry_after_secs: None,
            })
    }
}

/// Downloader that only succeeds for the listed versions and records every URL
pub struct MockDownloader {
    available: Vec<String>,
    requested: Mutex<Vec<String>>,
}

impl MockDownloader {
    pub fn new(available: Vec<&str>) -> Self {
        Self {
            available: available.into_iter().map(|v| v.to_string()).collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// URLs requested so far, in order
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    async fn download_and_extract(
        &self,
        url: &str,
        _kind: ArchiveKind,
        dest: &Path,
    ) -> Result<(), DownloadError> {
        self.requested.lock().unwrap().push(url.to_string());

        let available = self
            .available
            .iter()
            .any(|version| url.contains(&format!("/v{}/", version)));
        if !available {
            return Err(DownloadError::HttpStatus {
                url: url.to_string(),
                status: 404,
            });
        }

        std::fs::create_dir_all(dest)?;
        std::fs::write(dest.join("coolify"), b"binary")?;
        Ok(())
    }
}
