use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::version::error::ConfigError;

// =============================================================================
// Release locations
// =============================================================================

/// Base URL that release archives are downloaded from
pub const DEFAULT_BASE_DOWNLOAD_URL: &str =
    "https://github.com/coollabsio/coolify-cli/releases/download";

/// Default base URL for the GitHub REST API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Version used when no release index can be reached
pub const DEFAULT_FALLBACK_VERSION: &str = "1.4.0";

/// Coolify instance used when the `url` input is empty
pub const DEFAULT_INSTANCE_URL: &str = "https://app.coolify.io";

/// Number of recent releases tried after the primary download fails
pub const DEFAULT_RECENT_RELEASE_COUNT: u8 = 5;

/// Installer configuration
///
/// Every value that used to be a hardcoded constant lives here so tests and
/// self-hosted mirrors can point the installer somewhere else.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct InstallerConfig {
    /// Name of the cache entry (`<tool cache>/<tool_name>/<version>`)
    pub tool_name: String,
    /// Prefix of the release asset file name (`<asset_prefix>_<version>_...`)
    pub asset_prefix: String,
    /// Base URL that `v<version>/<asset>` is appended to
    pub base_download_url: String,
    pub github_api_url: String,
    pub fallback_version: String,
    pub fallback_instance_url: String,
    /// Repository whose releases are tried after the primary download fails
    pub release_repository: Repository,
    /// Repository whose latest release picks the version for `latest`
    pub latest_reference_repository: Repository,
    pub recent_release_count: u8,
    /// Name of the context created by `coolify context add`
    pub context_name: String,
    /// Overrides the tool cache root
    pub tool_cache: Option<PathBuf>,
    /// Bearer token for the GitHub API, raises the anonymous rate limit
    #[serde(skip)]
    pub github_token: Option<String>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            tool_name: "coolify".to_string(),
            asset_prefix: "coolify-cli".to_string(),
            base_download_url: DEFAULT_BASE_DOWNLOAD_URL.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            fallback_version: DEFAULT_FALLBACK_VERSION.to_string(),
            fallback_instance_url: DEFAULT_INSTANCE_URL.to_string(),
            release_repository: Repository::new("coollabsio", "coolify-cli"),
            latest_reference_repository: Repository::new("digitalocean", "doctl"),
            recent_release_count: DEFAULT_RECENT_RELEASE_COUNT,
            context_name: "actions-context".to_string(),
            tool_cache: None,
            github_token: None,
        }
    }
}

impl InstallerConfig {
    /// Loads the configuration from a JSON file, using defaults for missing fields
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fills in the values that come from the runner environment
    pub fn with_env(mut self) -> Self {
        self.github_token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());
        self
    }

    /// Returns the tool cache root, preferring the explicit override
    pub fn tool_cache_root(&self) -> PathBuf {
        self.tool_cache.clone().unwrap_or_else(tool_cache_dir)
    }
}

/// GitHub repository coordinates
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Returns the tool cache root.
/// Uses $RUNNER_TOOL_CACHE if set (GitHub-hosted and self-hosted runners),
/// otherwise falls back to ~/.local/share/setup-coolify/tool-cache,
/// or ./setup-coolify/tool-cache if no data directory is available.
pub fn tool_cache_dir() -> PathBuf {
    tool_cache_dir_with_env(std::env::var("RUNNER_TOOL_CACHE").ok(), dirs::data_dir())
}

fn tool_cache_dir_with_env(runner_tool_cache: Option<String>, data_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = runner_tool_cache.filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir);
    }

    data_dir
        .unwrap_or_else(|| PathBuf::from("."))
        .join("setup-coolify")
        .join("tool-cache")
}
