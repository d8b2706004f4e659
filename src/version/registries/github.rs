//! GitHub Releases API registry implementation

use crate::config::{DEFAULT_GITHUB_API_URL, Repository};
use crate::version::error::RegistryError;
use crate::version::registry::ReleaseRegistry;
use serde::Deserialize;
use tracing::{debug, warn};

/// Response item from the GitHub Releases API
#[derive(Debug, Deserialize)]
struct Release {
    name: Option<String>,
    tag_name: String,
}

impl Release {
    /// Release title, or the tag when the release was published without one
    fn into_version(self) -> String {
        match self.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => self.tag_name,
        }
    }
}

/// Registry implementation for the GitHub Releases API
pub struct GitHubRegistry {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubRegistry {
    /// Creates a new GitHubRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("setup-coolify/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Authenticates API requests with the given token
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, RegistryError> {
        debug!("GET {}", url);

        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(url.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || is_rate_limit_exhausted(&response)
        {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(RegistryError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        Ok(response)
    }
}

/// GitHub answers 403 instead of 429 once the primary rate limit is used up
fn is_rate_limit_exhausted(response: &reqwest::Response) -> bool {
    response.status() == reqwest::StatusCode::FORBIDDEN
        && response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0")
}

impl Default for GitHubRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_GITHUB_API_URL)
    }
}

#[async_trait::async_trait]
impl ReleaseRegistry for GitHubRegistry {
    async fn fetch_latest_release(&self, repository: &Repository) -> Result<String, RegistryError> {
        let url = format!("{}/repos/{}/releases/latest", self.base_url, repository);

        let release: Release = self.get(&url).await?.json().await.map_err(|e| {
            warn!("Failed to parse GitHub latest release response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        Ok(release.into_version())
    }

    async fn fetch_recent_releases(
        &self,
        repository: &Repository,
        count: u8,
    ) -> Result<Vec<String>, RegistryError> {
        let url = format!(
            "{}/repos/{}/releases?per_page={}",
            self.base_url, repository, count
        );

        let releases: Vec<Release> = self.get(&url).await?.json().await.map_err(|e| {
            warn!("Failed to parse GitHub releases response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        Ok(releases
            .into_iter()
            .take(usize::from(count))
            .map(Release::into_version)
            .collect())
    }
}
