//! Error types for release_git operations.
//!
//! Every git failure is mapped into [`GitError`] according to how much of the
//! underlying diagnostic may be surfaced. Push failures carry nothing but the
//! branch name.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release_git operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release_git operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Git operation errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// The git executable could not be launched
    #[error("Failed to execute '{operation}': {source}")]
    Spawn {
        /// Shape of the invocation that could not be started
        operation: String,
        /// Underlying launch failure
        #[source]
        source: std::io::Error,
    },

    /// Git ran and reported a failure
    #[error("Git operation '{operation}' failed{}: {reason}", exit_suffix(.code))]
    CommandFailed {
        /// Shape of the invocation that failed
        operation: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Diagnostic reported by git
        reason: String,
    },

    /// Push failed. The underlying output is dropped because the remote URL
    /// and git's diagnostics may embed credentials.
    #[error("An error occurred during the git push to the remote branch {branch}")]
    PushFailed {
        /// Target branch of the push
        branch: String,
    },

    /// The head commit could not be resolved
    #[error("Unable to resolve HEAD: {diagnostic}")]
    HeadUnavailable {
        /// Diagnostic reported by git
        diagnostic: String,
    },

    /// The index already holds changes outside the paths a release commit is
    /// restricted to
    #[error("Index has staged changes outside the release paths: {}", .paths.join(", "))]
    UnrelatedStagedChanges {
        /// Staged paths not covered by the release paths
        paths: Vec<String>,
    },

    /// Repository path is not a directory
    #[error("Repository path is not a directory: {}", .path.display())]
    NotADirectory {
        /// The offending path
        path: PathBuf,
    },

    /// Path is not inside a git work tree
    #[error("Not a git repository: {}", .path.display())]
    NotRepository {
        /// The offending path
        path: PathBuf,
    },

    /// Git executable missing from PATH
    #[error("Executable '{name}' not found in PATH")]
    ExecutableNotFound {
        /// Name that was looked up
        name: String,
    },
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" (exit code {})", code),
        None => String::new(),
    }
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for invalid arguments
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Git(GitError::ExecutableNotFound { name }) => vec![
                format!("Install {} and make sure it is on PATH", name),
                "Or pass the executable explicitly with --git <PATH>".to_string(),
            ],
            ReleaseError::Git(GitError::NotRepository { .. }) => vec![
                "Run from inside a git work tree or pass -C <PATH>".to_string(),
                "Initialize a repository: git init".to_string(),
            ],
            ReleaseError::Git(GitError::PushFailed { .. }) => vec![
                "Verify the remote URL and that its credentials are valid".to_string(),
                "Check that the branch is not protected against pushes".to_string(),
                "Fetch and rebase if the remote branch has moved".to_string(),
            ],
            ReleaseError::Git(GitError::UnrelatedStagedChanges { .. }) => vec![
                "Unstage unrelated changes: git restore --staged <PATH>".to_string(),
                "Or widen the release with additional --path arguments".to_string(),
            ],
            ReleaseError::Git(GitError::HeadUnavailable { .. }) => vec![
                "Create an initial commit before reading HEAD".to_string(),
            ],
            ReleaseError::Git(GitError::CommandFailed { operation, .. })
                if operation.starts_with("git commit") =>
            {
                vec![
                    "Stage changes before committing".to_string(),
                    "Configure an identity: release_git config user.email <EMAIL>".to_string(),
                ]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ReleaseError::Git(GitError::ExecutableNotFound { .. })
                | ReleaseError::Git(GitError::NotRepository { .. })
                | ReleaseError::Git(GitError::NotADirectory { .. })
        )
    }
}
