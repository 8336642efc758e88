//! Release commit coordination.
//!
//! Composes the gateway operations into the single "commit changed files and
//! push" step a release run performs after it has written its artifacts.

use crate::error::{GitError, ReleaseError, Result};
use crate::git::{GitGateway, GitOperations, RemoteTarget, RepoContext, StageReport};
use serde::Serialize;

/// Author identity written to the local config before committing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    /// Value for `user.name`
    pub name: String,
    /// Value for `user.email`
    pub email: String,
}

/// Input of [`ReleaseCommitter::commit_release`]
#[derive(Debug, Clone, Default)]
pub struct ReleaseCommitRequest {
    /// Commit message
    pub message: String,
    /// Restrict the commit to these paths (files or directories). Empty means
    /// every modified file plus whatever is already staged. When non-empty,
    /// the step refuses to run while the index holds changes outside them.
    pub paths: Vec<String>,
    /// Identity to configure before committing
    pub identity: Option<CommitIdentity>,
    /// Where to push afterwards, if anywhere
    pub remote: Option<RemoteTarget>,
}

/// Outcome of a release commit
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseCommitOutcome {
    /// Head before the step, `None` for a repository without commits
    pub head_before: Option<String>,
    /// Head after the step
    pub head_after: Option<String>,
    /// What the stage call did, if it ran
    pub stage_report: StageReport,
    /// Whether a commit was created
    pub committed: bool,
    /// Whether the commit was pushed
    pub pushed: bool,
}

impl ReleaseCommitOutcome {
    fn unchanged(head: Option<String>, stage_report: StageReport) -> Self {
        Self {
            head_before: head.clone(),
            head_after: head,
            stage_report,
            committed: false,
            pushed: false,
        }
    }
}

/// Runs the release commit step against any [`GitOperations`] implementation
#[derive(Debug, Clone)]
pub struct ReleaseCommitter<G = GitGateway> {
    git: G,
}

impl ReleaseCommitter<GitGateway> {
    /// Create a committer for the given repository context
    pub fn for_context(context: RepoContext) -> Self {
        Self::new(GitGateway::new(context))
    }
}

impl<G: GitOperations + Sync> ReleaseCommitter<G> {
    /// Wrap an existing git implementation
    pub fn new(git: G) -> Self {
        Self { git }
    }

    /// Underlying git operations
    pub fn git(&self) -> &G {
        &self.git
    }

    /// Stage, commit and optionally push the modified files selected by
    /// `request`. Nothing is committed when no selected file could be staged.
    pub async fn commit_release(&self, request: &ReleaseCommitRequest) -> Result<ReleaseCommitOutcome> {
        let head_before = self.current_head().await?;

        // `git commit` takes the whole index, so a path filter only holds if
        // nothing outside it is staged already.
        if !request.paths.is_empty() {
            let unrelated: Vec<String> = self
                .git
                .list_staged_files()
                .await?
                .into_iter()
                .filter(|file| !matches_any(file, &request.paths))
                .collect();
            if !unrelated.is_empty() {
                return Err(GitError::UnrelatedStagedChanges { paths: unrelated }.into());
            }
        }

        let modified = self.git.list_modified_files().await?;
        let files: Vec<String> = modified
            .into_iter()
            .filter(|file| matches_any(file, &request.paths))
            .collect();

        if files.is_empty() {
            log::info!("No modified files to commit");
            return Ok(ReleaseCommitOutcome::unchanged(head_before, StageReport::default()));
        }

        let stage_report = self.git.stage(&files).await?;
        if !stage_report.has_staged() {
            log::warn!("None of the {} modified file(s) could be staged", files.len());
            return Ok(ReleaseCommitOutcome::unchanged(head_before, stage_report));
        }

        if let Some(identity) = &request.identity {
            self.git.set_config("user.name", &identity.name).await?;
            self.git.set_config("user.email", &identity.email).await?;
        }

        self.git.commit(&request.message).await?;
        log::info!("Committed {} file(s)", stage_report.staged.len());

        let pushed = match &request.remote {
            Some(remote) => {
                self.git.push(remote).await?;
                log::info!("Pushed to branch {}", remote.branch());
                true
            }
            None => false,
        };

        let head_after = Some(self.git.head_commit_id().await?);

        Ok(ReleaseCommitOutcome {
            head_before,
            head_after,
            stage_report,
            committed: true,
            pushed,
        })
    }

    /// Head commit, or `None` when HEAD does not resolve yet
    async fn current_head(&self) -> Result<Option<String>> {
        match self.git.head_commit_id().await {
            Ok(head) => Ok(Some(head)),
            Err(ReleaseError::Git(GitError::HeadUnavailable { diagnostic })) => {
                log::debug!("No head commit yet: {}", diagnostic);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// An empty filter matches everything; otherwise a file matches a filter entry
/// it equals or lies beneath.
fn matches_any(file: &str, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }
    filters.iter().any(|filter| {
        let filter = filter.strip_prefix("./").unwrap_or(filter).trim_end_matches('/');
        filter.is_empty()
            || filter == "."
            || file == filter
            || file
                .strip_prefix(filter)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}
