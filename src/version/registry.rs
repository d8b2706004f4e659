//! Registry trait for looking up published releases

#[cfg(test)]
use mockall::automock;

use crate::config::Repository;
use crate::version::error::RegistryError;

/// Trait for querying a release index
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseRegistry: Send + Sync {
    /// Fetches the name of the latest published release of a repository
    async fn fetch_latest_release(&self, repository: &Repository) -> Result<String, RegistryError>;

    /// Fetches the names of the most recent releases
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - At most `count` release names, ordered from newest to oldest
    /// * `Err(RegistryError)` - If the fetch fails
    async fn fetch_recent_releases(
        &self,
        repository: &Repository,
        count: u8,
    ) -> Result<Vec<String>, RegistryError>;
}
