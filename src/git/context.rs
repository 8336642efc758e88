//! Repository context passed into every git operation.

use crate::error::{GitError, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Name of the executable looked up on PATH
pub const GIT_EXECUTABLE: &str = "git";

/// Working directory and git executable an operation runs against.
///
/// Every invocation runs with `current_dir` set to [`RepoContext::root`], so
/// nothing depends on the process-wide working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContext {
    root: PathBuf,
    executable: PathBuf,
}

impl RepoContext {
    /// Create a context rooted at `path`, resolving `git` from PATH.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let executable = which::which(GIT_EXECUTABLE).map_err(|_| GitError::ExecutableNotFound {
            name: GIT_EXECUTABLE.to_string(),
        })?;
        Self::with_executable(path, executable)
    }

    /// Create a context with an explicit git executable.
    pub fn with_executable(path: impl AsRef<Path>, executable: impl Into<PathBuf>) -> Result<Self> {
        let root = path.as_ref().absolutize()?.into_owned();
        if !root.is_dir() {
            return Err(GitError::NotADirectory { path: root }.into());
        }

        Ok(Self {
            root,
            executable: executable.into(),
        })
    }

    /// Create a context and re-root it at the top level of the enclosing
    /// work tree.
    pub async fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let context = Self::new(path)?;
        context.into_toplevel().await
    }

    /// Re-root an existing context at its work tree's top level.
    pub async fn into_toplevel(self) -> Result<Self> {
        let output = Command::new(&self.executable)
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(&self.root)
            .output()
            .await
            .map_err(|e| GitError::Spawn {
                operation: "git rev-parse --show-toplevel".to_string(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(GitError::NotRepository { path: self.root }.into());
        }

        let toplevel = String::from_utf8_lossy(&output.stdout).trim().to_string();
        log::debug!("Discovered work tree root {}", toplevel);
        Self::with_executable(toplevel, self.executable)
    }

    /// Directory git runs in
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Git executable used for every invocation
    pub fn executable(&self) -> &Path {
        &self.executable
    }
}
