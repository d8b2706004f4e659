//! Version resolution and download with fallback
//!
//! Resolution order:
//!
//! 1. `latest` is turned into a concrete version through the latest-release
//!    lookup, or the configured fallback version when the lookup fails.
//! 2. A complete tool cache entry for that version is used as is.
//! 3. Otherwise the version is downloaded once.
//! 4. If that fails, the most recent releases of the tool are tried newest
//!    first. An explicitly requested version is not retried here.
//!
//! Every individual failure is a warning. Only running out of candidates is
//! an error.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::InstallerConfig;
use crate::version::cache::ToolCache;
use crate::version::download::Downloader;
use crate::version::error::{CacheError, DownloadError, InstallError};
use crate::version::extract::ArchiveKind;
use crate::version::platform::Platform;
use crate::version::registry::ReleaseRegistry;
use crate::version::types::{Installation, RequestedVersion, normalize_version};

/// Result of walking the candidate list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackOutcome {
    /// A candidate was installed
    Installed(Installation),
    /// Every candidate failed, in this order
    Exhausted { attempted: Vec<String> },
}

pub struct Installer {
    config: InstallerConfig,
    platform: Platform,
    registry: Arc<dyn ReleaseRegistry>,
    downloader: Arc<dyn Downloader>,
    cache: ToolCache,
}

impl Installer {
    pub fn new(
        config: InstallerConfig,
        platform: Platform,
        registry: Arc<dyn ReleaseRegistry>,
        downloader: Arc<dyn Downloader>,
        cache: ToolCache,
    ) -> Self {
        Self {
            config,
            platform,
            registry,
            downloader,
            cache,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Download URL of the release asset for `version` (normalized)
    pub fn download_url(&self, version: &str) -> String {
        format!(
            "{}/v{}/{}",
            self.config.base_download_url.trim_end_matches('/'),
            version,
            self.platform.asset_name(&self.config.asset_prefix, version)
        )
    }

    /// Turns the requested version into a normalized concrete version
    pub async fn resolve_version(&self, requested: &RequestedVersion) -> String {
        let version = match requested {
            RequestedVersion::Specific(version) => version.clone(),
            RequestedVersion::Latest => {
                let reference = &self.config.latest_reference_repository;
                match self.registry.fetch_latest_release(reference).await {
                    Ok(version) => {
                        debug!("Latest release of {} is {}", reference, version);
                        version
                    }
                    // Runners share IPs and hit the anonymous rate limit regularly
                    Err(e) => {
                        warn!(
                            "{}\n\nFailed to retrieve latest version; falling back to: {}",
                            e, self.config.fallback_version
                        );
                        self.config.fallback_version.clone()
                    }
                }
            }
        };

        normalize_version(&version).to_string()
    }

    /// Produces an installation for the requested version
    pub async fn install(&self, requested: &RequestedVersion) -> Result<Installation, InstallError> {
        let version = self.resolve_version(requested).await;

        if let Some(installation) = self.attempt(&version).await? {
            return Ok(installation);
        }

        match self.fallback_chain().await? {
            FallbackOutcome::Installed(installation) => Ok(installation),
            FallbackOutcome::Exhausted { attempted } => Err(InstallError::Exhausted {
                tool: self.config.tool_name.clone(),
                attempted,
            }),
        }
    }

    /// Tries the most recent releases in order until one installs
    pub async fn fallback_chain(&self) -> Result<FallbackOutcome, CacheError> {
        let candidates = self.candidate_versions().await;

        for version in &candidates {
            if let Some(installation) = self.attempt(version).await? {
                info!(
                    "Successfully downloaded {} v{}",
                    self.config.tool_name, version
                );
                return Ok(FallbackOutcome::Installed(installation));
            }
        }

        Ok(FallbackOutcome::Exhausted {
            attempted: candidates,
        })
    }

    /// Recent release names, newest first, or the fallback version
    pub async fn candidate_versions(&self) -> Vec<String> {
        let repository = &self.config.release_repository;
        let fallback = vec![self.config.fallback_version.clone()];

        match self
            .registry
            .fetch_recent_releases(repository, self.config.recent_release_count)
            .await
        {
            Ok(releases) if releases.is_empty() => {
                warn!("No releases published for {}", repository);
                fallback
            }
            Ok(releases) => releases
                .iter()
                .map(|release| normalize_version(release).to_string())
                .collect(),
            Err(e) => {
                warn!("Failed to fetch recent releases: {}", e);
                fallback
            }
        }
    }

    /// Uses the cache entry for `version` or downloads it.
    ///
    /// `Ok(None)` means this version is unusable.
    async fn attempt(&self, version: &str) -> Result<Option<Installation>, CacheError> {
        let tool = &self.config.tool_name;

        if let Some(path) = self.cache.find(tool, version) {
            return Ok(Some(Installation {
                path,
                version: version.to_string(),
                from_cache: true,
            }));
        }

        info!("Attempting to download {} v{}", tool, version);
        match self.download(version).await {
            Ok(staged) => {
                let path = self.cache.store(&staged, tool, version)?;
                Ok(Some(Installation {
                    path,
                    version: version.to_string(),
                    from_cache: false,
                }))
            }
            Err(e) => {
                warn!("Failed to download {} v{}: {}", tool, version, e);
                Ok(None)
            }
        }
    }

    async fn download(&self, version: &str) -> Result<PathBuf, DownloadError> {
        let url = self.download_url(version);
        debug!("{} download url: {}", self.config.tool_name, url);

        let kind = ArchiveKind::from_extension(self.platform.extension).ok_or_else(|| {
            DownloadError::Extract(format!(
                "Unsupported archive extension: {}",
                self.platform.extension
            ))
        })?;
        let staging = self.cache.staging_dir(&self.config.tool_name, version);

        self.downloader
            .download_and_extract(&url, kind, &staging)
            .await?;

        Ok(staging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::logging::tests::buffered_subscriber;
    use crate::config::Repository;
    use crate::version::download::MockDownloader;
    use crate::version::error::RegistryError;
    use crate::version::registry::MockReleaseRegistry;
    use mockall::Sequence;
    use mockall::predicate::eq;
    use std::path::Path;
    use tempfile::TempDir;

    fn linux_amd64() -> Platform {
        Platform::resolve("linux", "x64").platform
    }

    fn installer(
        temp_dir: &TempDir,
        registry: MockReleaseRegistry,
        downloader: MockDownloader,
    ) -> Installer {
        Installer::new(
            InstallerConfig::default(),
            linux_amd64(),
            Arc::new(registry),
            Arc::new(downloader),
            ToolCache::new(temp_dir.path(), "x64"),
        )
    }

    fn extract_fake_binary(dest: &Path) -> Result<(), DownloadError> {
        std::fs::create_dir_all(dest)?;
        std::fs::write(dest.join("coolify"), b"binary")?;
        Ok(())
    }

    fn not_found(url: &str) -> DownloadError {
        DownloadError::HttpStatus {
            url: url.to_string(),
            status: 404,
        }
    }

    fn seed_cache(temp_dir: &TempDir, version: &str) -> PathBuf {
        let cache = ToolCache::new(temp_dir.path(), "x64");
        let staged = cache.staging_dir("coolify", version);
        extract_fake_binary(&staged).unwrap();
        cache.store(&staged, "coolify", version).unwrap()
    }

    #[test]
    fn download_url_matches_release_layout() {
        let temp_dir = TempDir::new().unwrap();
        let installer = installer(
            &temp_dir,
            MockReleaseRegistry::new(),
            MockDownloader::new(),
        );

        assert_eq!(
            installer.download_url("1.4.0"),
            "https://github.com/coollabsio/coolify-cli/releases/download/v1.4.0/coolify-cli_1.4.0_linux_amd64.tar.gz"
        );
    }

    #[tokio::test]
    async fn resolve_version_strips_v_from_specific_version() {
        let temp_dir = TempDir::new().unwrap();
        let installer = installer(
            &temp_dir,
            MockReleaseRegistry::new(),
            MockDownloader::new(),
        );

        let version = installer
            .resolve_version(&RequestedVersion::Specific("v1.3.9".to_string()))
            .await;

        assert_eq!(version, "1.3.9");
    }

    #[tokio::test]
    async fn resolve_version_uses_latest_reference_release() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = MockReleaseRegistry::new();
        registry
            .expect_fetch_latest_release()
            .with(eq(Repository::new("digitalocean", "doctl")))
            .times(1)
            .returning(|_| Ok("v1.110.0".to_string()));
        let installer = installer(&temp_dir, registry, MockDownloader::new());

        let version = installer.resolve_version(&RequestedVersion::Latest).await;

        assert_eq!(version, "1.110.0");
    }

    #[tokio::test]
    async fn resolve_version_falls_back_when_latest_lookup_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = MockReleaseRegistry::new();
        registry.expect_fetch_latest_release().times(1).returning(|_| {
            Err(RegistryError::RateLimited {
                retry_after_secs: Some(60),
            })
        });
        let installer = installer(&temp_dir, registry, MockDownloader::new());

        let (buffer, subscriber) = buffered_subscriber();
        let _guard = tracing::subscriber::set_default(subscriber);

        let version = installer.resolve_version(&RequestedVersion::Latest).await;

        assert_eq!(version, "1.4.0");
        let warnings = buffer.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Rate limited"));
        assert!(warnings[0].ends_with("falling back to: 1.4.0"));
    }

    #[tokio::test]
    async fn failed_direct_download_is_reported_as_warning() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = MockReleaseRegistry::new();
        registry
            .expect_fetch_recent_releases()
            .times(1)
            .returning(|_, _| Ok(vec!["1.3.9".to_string()]));
        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_and_extract()
            .withf(|url, _, _| url.contains("/v1.4.0/"))
            .times(1)
            .returning(|url, _, _| Err(not_found(url)));
        downloader
            .expect_download_and_extract()
            .withf(|url, _, _| url.contains("/v1.3.9/"))
            .times(1)
            .returning(|_, _, dest| extract_fake_binary(dest));
        let installer = installer(&temp_dir, registry, downloader);
        let (buffer, subscriber) = buffered_subscriber();
        let _guard = tracing::subscriber::set_default(subscriber);

        let installation = installer
            .install(&RequestedVersion::Specific("1.4.0".to_string()))
            .await
            .unwrap();

        assert_eq!(installation.version, "1.3.9");
        let warnings = buffer.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("::warning::Failed to download coolify v1.4.0: "));
        assert!(warnings[0].contains("Unexpected HTTP status 404"));
        assert!(buffer.contents().contains("Successfully downloaded coolify v1.3.9"));
    }

    #[tokio::test]
    async fn install_returns_cached_version_without_network() {
        let temp_dir = TempDir::new().unwrap();
        let cached = seed_cache(&temp_dir, "1.4.0");
        // Mocks without expectations panic when called
        let installer = installer(
            &temp_dir,
            MockReleaseRegistry::new(),
            MockDownloader::new(),
        );

        let installation = installer
            .install(&RequestedVersion::Specific("v1.4.0".to_string()))
            .await
            .unwrap();

        assert_eq!(
            installation,
            Installation {
                path: cached,
                version: "1.4.0".to_string(),
                from_cache: true,
            }
        );
    }

    #[tokio::test]
    async fn install_downloads_and_caches_requested_version() {
        let temp_dir = TempDir::new().unwrap();
        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_and_extract()
            .withf(|url, kind, _| {
                url.ends_with("/v1.4.0/coolify-cli_1.4.0_linux_amd64.tar.gz")
                    && *kind == ArchiveKind::TarGz
            })
            .times(1)
            .returning(|_, _, dest| extract_fake_binary(dest));
        let installer = installer(&temp_dir, MockReleaseRegistry::new(), downloader);

        let installation = installer
            .install(&RequestedVersion::Specific("1.4.0".to_string()))
            .await
            .unwrap();

        assert_eq!(installation.version, "1.4.0");
        assert!(!installation.from_cache);
        assert_eq!(installation.path, temp_dir.path().join("coolify/1.4.0/x64"));
        assert!(installation.path.join("coolify").is_file());
        assert_eq!(
            ToolCache::new(temp_dir.path(), "x64").find("coolify", "1.4.0"),
            Some(installation.path)
        );
    }

    #[tokio::test]
    async fn install_tries_recent_releases_in_order_after_direct_failure() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = MockReleaseRegistry::new();
        registry
            .expect_fetch_recent_releases()
            .with(eq(Repository::new("coollabsio", "coolify-cli")), eq(5))
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    "1.4.1".to_string(),
                    "1.4.0".to_string(),
                    "1.3.9".to_string(),
                    "1.3.8".to_string(),
                    "1.3.7".to_string(),
                ])
            });

        let mut seq = Sequence::new();
        let mut downloader = MockDownloader::new();
        for failing in ["1.4.0", "1.4.1", "1.4.0"] {
            let suffix = format!("/v{failing}/coolify-cli_{failing}_linux_amd64.tar.gz");
            downloader
                .expect_download_and_extract()
                .withf(move |url, _, _| url.ends_with(&suffix))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|url, _, _| Err(not_found(url)));
        }
        downloader
            .expect_download_and_extract()
            .withf(|url, _, _| url.ends_with("/v1.3.9/coolify-cli_1.3.9_linux_amd64.tar.gz"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, dest| extract_fake_binary(dest));
        let installer = installer(&temp_dir, registry, downloader);

        let installation = installer
            .install(&RequestedVersion::Specific("1.4.0".to_string()))
            .await
            .unwrap();

        assert_eq!(installation.version, "1.3.9");
        assert_eq!(installation.path, temp_dir.path().join("coolify/1.3.9/x64"));
    }

    #[tokio::test]
    async fn install_uses_fallback_version_when_release_index_is_unreachable() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = MockReleaseRegistry::new();
        registry
            .expect_fetch_recent_releases()
            .times(1)
            .returning(|_, _| Err(RegistryError::InvalidResponse("boom".to_string())));

        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_and_extract()
            .withf(|url, _, _| url.contains("/v2.0.0/"))
            .times(1)
            .returning(|url, _, _| Err(not_found(url)));
        downloader
            .expect_download_and_extract()
            .withf(|url, _, _| url.contains("/v1.4.0/"))
            .times(1)
            .returning(|_, _, dest| extract_fake_binary(dest));
        let installer = installer(&temp_dir, registry, downloader);

        let installation = installer
            .install(&RequestedVersion::Specific("2.0.0".to_string()))
            .await
            .unwrap();

        assert_eq!(installation.version, "1.4.0");
    }

    #[tokio::test]
    async fn install_fails_with_every_attempted_version_when_exhausted() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = MockReleaseRegistry::new();
        registry
            .expect_fetch_latest_release()
            .returning(|_| Err(RegistryError::NotFound("doctl".to_string())));
        registry.expect_fetch_recent_releases().returning(|_, _| {
            Ok(vec![
                "v1.4.1".to_string(),
                "1.4.0".to_string(),
                "1.3.9".to_string(),
            ])
        });

        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_and_extract()
            .times(4)
            .returning(|url, _, _| Err(not_found(url)));
        let installer = installer(&temp_dir, registry, downloader);

        let err = installer
            .install(&RequestedVersion::Latest)
            .await
            .unwrap_err();

        assert!(matches!(
            &err,
            InstallError::Exhausted { attempted, .. }
                if attempted == &vec!["1.4.1".to_string(), "1.4.0".to_string(), "1.3.9".to_string()]
        ));
        assert_eq!(
            err.to_string(),
            "Failed to download coolify. Tried versions: 1.4.1, 1.4.0, 1.3.9"
        );
    }

    #[tokio::test]
    async fn fallback_chain_reuses_cached_candidate() {
        let temp_dir = TempDir::new().unwrap();
        let cached = seed_cache(&temp_dir, "1.3.9");
        let mut registry = MockReleaseRegistry::new();
        registry
            .expect_fetch_recent_releases()
            .returning(|_, _| Ok(vec!["1.4.1".to_string(), "1.3.9".to_string()]));
        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_and_extract()
            .withf(|url, _, _| url.contains("/v1.4.1/"))
            .times(1)
            .returning(|url, _, _| Err(not_found(url)));
        let installer = installer(&temp_dir, registry, downloader);

        let outcome = installer.fallback_chain().await.unwrap();

        assert_eq!(
            outcome,
            FallbackOutcome::Installed(Installation {
                path: cached,
                version: "1.3.9".to_string(),
                from_cache: true,
            })
        );
    }

    #[tokio::test]
    async fn candidate_versions_substitutes_fallback_for_empty_index() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = MockReleaseRegistry::new();
        registry
            .expect_fetch_recent_releases()
            .returning(|_, _| Ok(Vec::new()));
        let installer = installer(&temp_dir, registry, MockDownloader::new());

        assert_eq!(installer.candidate_versions().await, vec!["1.4.0".to_string()]);
    }

    #[tokio::test]
    async fn install_uses_zip_assets_on_windows() {
        let temp_dir = TempDir::new().unwrap();
        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_and_extract()
            .withf(|url, kind, _| {
                url.ends_with("/v1.4.0/coolify-cli_1.4.0_windows_amd64.zip")
                    && *kind == ArchiveKind::Zip
            })
            .times(1)
            .returning(|_, _, dest| extract_fake_binary(dest));
        let installer = Installer::new(
            InstallerConfig::default(),
            Platform::resolve("win32", "x64").platform,
            Arc::new(MockReleaseRegistry::new()),
            Arc::new(downloader),
            ToolCache::new(temp_dir.path(), "x64"),
        );

        let installation = installer
            .install(&RequestedVersion::Specific("1.4.0".to_string()))
            .await
            .unwrap();

        assert_eq!(installation.version, "1.4.0");
    }
}
