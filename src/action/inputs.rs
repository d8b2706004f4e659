//! Action inputs passed by the runner as `INPUT_<NAME>` variables

use crate::action::error::ActionError;
use crate::version::types::RequestedVersion;

/// A value that must never appear in logs
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInputs {
    pub version: RequestedVersion,
    pub token: Secret,
    /// Coolify instance the context points at
    pub url: String,
}

impl ActionInputs {
    /// Reads the inputs from the process environment
    pub fn from_env(fallback_url: &str) -> Result<Self, ActionError> {
        Self::from_lookup(|name| std::env::var(name).ok(), fallback_url)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        fallback_url: &str,
    ) -> Result<Self, ActionError> {
        let version = RequestedVersion::parse(&get_input(&lookup, "version"));

        let token = get_input(&lookup, "token");
        if token.is_empty() {
            return Err(ActionError::MissingInput("token"));
        }

        let url = match get_input(&lookup, "url") {
            url if url.is_empty() => fallback_url.to_string(),
            url => url,
        };

        Ok(Self {
            version,
            token: Secret::new(token),
            url,
        })
    }
}

/// Environment variable the runner uses for an input
pub fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

fn get_input(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> String {
    lookup(&input_env_name(name))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}
