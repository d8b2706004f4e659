use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::version::error::CacheError;

/// Directory under the cache root that downloads are extracted into
const STAGING_DIR: &str = ".staging";

/// Runner tool cache
///
/// Layout matches the one used by the Actions toolkit, so entries written by
/// other setup actions or previous runs are picked up:
///
/// ```text
/// <root>/<tool>/<version>/<arch>/            extracted files
/// <root>/<tool>/<version>/<arch>.complete    marker written last
/// ```
#[derive(Debug, Clone)]
pub struct ToolCache {
    root: PathBuf,
    arch: String,
}

impl ToolCache {
    pub fn new(root: impl Into<PathBuf>, arch: &str) -> Self {
        Self {
            root: root.into(),
            arch: arch.to_string(),
        }
    }

    /// Cache for the architecture this binary was built for
    pub fn for_host(root: impl Into<PathBuf>) -> Self {
        Self::new(root, host_arch())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_dir(&self, tool: &str, version: &str) -> PathBuf {
        self.root.join(tool).join(version).join(&self.arch)
    }

    fn marker_path(&self, tool: &str, version: &str) -> PathBuf {
        self.root
            .join(tool)
            .join(version)
            .join(format!("{}.complete", self.arch))
    }

    /// Returns the cached installation directory if a complete entry exists
    pub fn find(&self, tool: &str, version: &str) -> Option<PathBuf> {
        if tool.is_empty() || version.is_empty() {
            return None;
        }

        let dir = self.entry_dir(tool, version);
        if dir.is_dir() && self.marker_path(tool, version).is_file() {
            debug!("Found {} {} in tool cache at {:?}", tool, version, dir);
            Some(dir)
        } else {
            debug!("{} {} not found in tool cache", tool, version);
            None
        }
    }

    /// Returns the staging directory a download for this key is extracted into
    pub fn staging_dir(&self, tool: &str, version: &str) -> PathBuf {
        self.root
            .join(STAGING_DIR)
            .join(format!("{}-{}-{}", tool, version, self.arch))
    }

    /// Moves a staged directory into the cache and marks it complete
    pub fn store(&self, staged: &Path, tool: &str, version: &str) -> Result<PathBuf, CacheError> {
        let dest = self.entry_dir(tool, version);
        let marker = self.marker_path(tool, version);

        // An entry without marker is a leftover of an interrupted store
        remove_if_exists(&marker)?;
        if dest.exists() {
            std::fs::remove_dir_all(&dest).map_err(|source| io_error(&dest, source))?;
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }
        std::fs::rename(staged, &dest).map_err(|source| io_error(&dest, source))?;
        std::fs::write(&marker, b"").map_err(|source| io_error(&marker, source))?;

        info!("Cached {} {} at {:?}", tool, version, dest);
        Ok(dest)
    }
}

fn remove_if_exists(path: &Path) -> Result<(), CacheError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(io_error(path, source)),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Architecture name used in cache paths, matching the runner's naming
fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "ia32",
        other => other,
    }
}
