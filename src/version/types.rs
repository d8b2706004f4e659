//! Common types shared by the version layer

use std::path::PathBuf;

/// Sentinel accepted in the `version` input
pub const LATEST: &str = "latest";

/// Version requested by the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedVersion {
    /// Resolve through the latest-release lookup
    Latest,
    /// A concrete version, possibly `v`-prefixed
    Specific(String),
}

impl RequestedVersion {
    /// Parses the raw `version` input. Empty input means `latest`.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(LATEST) {
            Self::Latest
        } else {
            Self::Specific(trimmed.to_string())
        }
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }
}

impl std::fmt::Display for RequestedVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Specific(version) => f.write_str(version),
        }
    }
}

/// Strips a single leading `v`
pub fn normalize_version(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// A usable installation of the tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    /// Directory containing the extracted tool
    pub path: PathBuf,
    /// Version actually installed, may differ from the requested one
    pub version: String,
    /// True when no download happened
    pub from_cache: bool,
}
