//! GitHub Actions host layer
//!
//! Everything the action does to the runner: reading inputs, masking the
//! token, extending `PATH`, rendering logs as workflow commands and running
//! `coolify context add`.
//!
//! # Modules
//!
//! - [`commands`]: Workflow commands and `$GITHUB_PATH`
//! - [`error`]: Errors that fail the step
//! - [`inputs`]: `INPUT_*` parsing and the `Secret` wrapper
//! - [`logging`]: Tracing layer that emits workflow commands
//! - [`login`]: The `context add` invocation

pub mod commands;
pub mod error;
pub mod inputs;
pub mod logging;
pub mod login;

use std::io::Write;
use std::sync::Arc;

use tracing::{info, warn};

use crate::action::commands::WorkflowCommands;
use crate::action::error::ActionError;
use crate::action::inputs::ActionInputs;
use crate::action::login::ContextLogin;
use crate::config::InstallerConfig;
use crate::version::cache::ToolCache;
use crate::version::download::HttpDownloader;
use crate::version::installer::Installer;
use crate::version::platform::Platform;
use crate::version::registries::GitHubRegistry;
use crate::version::types::{Installation, RequestedVersion};

/// Builds the installer for the current host and runner
pub fn build_installer(config: &InstallerConfig) -> Installer {
    let resolved = Platform::host();
    for warning in &resolved.warnings {
        warn!("{}", warning);
    }

    let registry =
        GitHubRegistry::new(&config.github_api_url).with_token(config.github_token.clone());

    Installer::new(
        config.clone(),
        resolved.platform,
        Arc::new(registry),
        Arc::new(HttpDownloader::new()),
        ToolCache::for_host(config.tool_cache_root()),
    )
}

/// Installs the requested version and puts it on `PATH`
pub async fn install<W: Write>(
    installer: &Installer,
    config: &InstallerConfig,
    version: &RequestedVersion,
    commands: &mut WorkflowCommands<W>,
) -> Result<Installation, ActionError> {
    let installation = installer.install(version).await?;
    commands.add_path(&installation.path)?;

    info!(
        ">>> {} version v{} installed to {}",
        config.tool_name,
        installation.version,
        installation.path.display()
    );
    Ok(installation)
}

/// Full action: mask the token, install, then create the context
pub async fn run<W: Write>(
    installer: &Installer,
    config: &InstallerConfig,
    inputs: &ActionInputs,
    commands: &mut WorkflowCommands<W>,
) -> Result<Installation, ActionError> {
    commands.set_secret(&inputs.token)?;

    let installation = install(installer, config, &inputs.version, commands).await?;

    ContextLogin::new(
        &config.tool_name,
        &config.context_name,
        &inputs.token,
        &inputs.url,
    )
    .run(&installation.path, commands.path_env())
    .await?;

    info!(">>> Successfully logged into {}", config.tool_name);
    Ok(installation)
}
