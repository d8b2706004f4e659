//! Creates the Coolify context with the installed CLI

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::info;

use crate::action::error::ActionError;
use crate::action::inputs::Secret;

/// `<tool> context add <name> <token> <url> --default --force`
pub struct ContextLogin<'a> {
    tool: &'a str,
    context_name: &'a str,
    token: &'a Secret,
    url: &'a str,
}

impl<'a> ContextLogin<'a> {
    pub fn new(tool: &'a str, context_name: &'a str, token: &'a Secret, url: &'a str) -> Self {
        Self {
            tool,
            context_name,
            token,
            url,
        }
    }

    pub fn args(&self) -> [&str; 7] {
        [
            "context",
            "add",
            self.context_name,
            self.token.expose(),
            self.url,
            "--default",
            "--force",
        ]
    }

    /// Command line as it may appear in logs
    pub fn display(&self) -> String {
        format!(
            "{} context add {} *** {} --default --force",
            self.tool, self.context_name, self.url
        )
    }

    /// Runs the command with the tool from `install_dir`
    pub async fn run(&self, install_dir: &Path, path_env: &OsStr) -> Result<(), ActionError> {
        let program = executable(install_dir, self.tool);
        info!("[command]{}", self.display());

        let status = Command::new(&program)
            .args(self.args())
            .env("PATH", path_env)
            .status()
            .await
            .map_err(|source| ActionError::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        if !status.success() {
            return Err(ActionError::CommandFailed {
                command: self.display(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// The tool binary inside `install_dir`, or the bare name to look up on `PATH`
pub fn executable(install_dir: &Path, tool: &str) -> PathBuf {
    let file_name = format!("{}{}", tool, std::env::consts::EXE_SUFFIX);
    let candidate = install_dir.join(&file_name);
    if candidate.is_file() {
        candidate
    } else {
        PathBuf::from(file_name)
    }
}
