//! Workflow commands understood by the Actions runner

use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::action::inputs::Secret;

/// Escapes a command message so it stays on one line
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Writes workflow commands and keeps the `PATH` handed to child processes
pub struct WorkflowCommands<W: Write> {
    out: W,
    github_path: Option<PathBuf>,
    path: OsString,
}

impl WorkflowCommands<std::io::Stdout> {
    /// Commands for the current runner, writing to stdout
    pub fn from_env() -> Self {
        Self::new(
            std::io::stdout(),
            std::env::var_os("GITHUB_PATH")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            std::env::var_os("PATH").unwrap_or_default(),
        )
    }
}

impl<W: Write> WorkflowCommands<W> {
    pub fn new(out: W, github_path: Option<PathBuf>, path: OsString) -> Self {
        Self {
            out,
            github_path,
            path,
        }
    }

    /// Registers a value the runner masks in all later log output
    pub fn set_secret(&mut self, secret: &Secret) -> std::io::Result<()> {
        writeln!(self.out, "::add-mask::{}", escape_data(secret.expose()))
    }

    /// Puts `dir` in front of `PATH` for this step and every later one
    pub fn add_path(&mut self, dir: &Path) -> std::io::Result<()> {
        if let Some(github_path) = &self.github_path {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(github_path)?;
            writeln!(file, "{}", dir.display())?;
        } else {
            debug!("GITHUB_PATH is not set, {:?} is only added for this step", dir);
        }

        let existing = std::env::split_paths(&self.path).filter(|p| !p.as_os_str().is_empty());
        let paths = std::iter::once(dir.to_path_buf()).chain(existing);
        self.path = std::env::join_paths(paths)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        Ok(())
    }

    /// `PATH` including every directory added so far
    pub fn path_env(&self) -> &OsStr {
        &self.path
    }

    /// Marks the step failed; the caller exits non-zero
    pub fn set_failed(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.out, "::error::{}", escape_data(message))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
