//! Git operations using CLI commands via tokio::process

use crate::error::{GitError, Result};
use crate::git::context::RepoContext;
use crate::git::stage::StageReport;
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Operations a release step needs from the version-control executable
#[async_trait::async_trait]
pub trait GitOperations {
    /// Modified and untracked files that are not ignored, in git's order
    async fn list_modified_files(&self) -> Result<Vec<String>>;
    /// Paths whose staged content differs from HEAD (or every index entry on an unborn branch)
    async fn list_staged_files(&self) -> Result<Vec<String>>;
    /// Best-effort add of `files` to the index; rejected paths are reported, not raised
    async fn stage(&self, files: &[String]) -> Result<StageReport>;
    /// Set a configuration value in the repository's local config
    async fn set_config(&self, name: &str, value: &str) -> Result<()>;
    /// Commit the index with `message`
    async fn commit(&self, message: &str) -> Result<()>;
    /// Push HEAD and all tags to `target`
    async fn push(&self, target: &RemoteTarget) -> Result<()>;
    /// Full hash of the head commit
    async fn head_commit_id(&self) -> Result<String>;
}

/// Push destination.
///
/// The URL may embed credentials, so it is never logged or displayed.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    url: String,
    branch: String,
}

impl RemoteTarget {
    /// Create a push target for `branch` on the remote at `url`
    pub fn new(url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            branch: branch.into(),
        }
    }

    /// Target branch name
    pub fn branch(&self) -> &str {
        &self.branch
    }

    fn refspec(&self) -> String {
        format!("HEAD:{}", self.branch)
    }
}

impl std::fmt::Debug for RemoteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteTarget")
            .field("url", &"<redacted>")
            .field("branch", &self.branch)
            .finish()
    }
}

/// Git gateway shelling out to the executable held by a [`RepoContext`]
#[derive(Debug, Clone)]
pub struct GitGateway {
    context: RepoContext,
}

impl GitGateway {
    /// Create a gateway for the given repository context
    pub fn new(context: RepoContext) -> Self {
        Self { context }
    }

    /// Open a gateway on `path`, resolving git from PATH
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(RepoContext::new(path)?))
    }

    /// Repository context this gateway runs in
    pub fn context(&self) -> &RepoContext {
        &self.context
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(self.context.executable());
        cmd.args(args)
            .current_dir(self.context.root())
            .stdin(Stdio::null());
        cmd
    }

    async fn run_git(&self, args: &[&str]) -> Result<Output> {
        let operation = describe(args);
        log::debug!("Running {}", operation);
        let output = self
            .command(args)
            .output()
            .await
            .map_err(|e| GitError::Spawn {
                operation: operation.clone(),
                source: e,
            })?;
        log::debug!("{} exited with {}", operation, output.status);
        Ok(output)
    }

    async fn run_git_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run_git(args).await?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                operation: describe(args),
                code: output.status.code(),
                reason: failure_reason(&output),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait::async_trait]
impl GitOperations for GitGateway {
    async fn list_modified_files(&self) -> Result<Vec<String>> {
        let stdout = self
            .run_git_checked(&[
                "-c",
                UNQUOTED_PATHS,
                "ls-files",
                "-m",
                "-o",
                "--exclude-standard",
            ])
            .await?;
        Ok(parse_file_list(&stdout))
    }

    async fn list_staged_files(&self) -> Result<Vec<String>> {
        let stdout = self
            .run_git_checked(&["-c", UNQUOTED_PATHS, "diff", "--cached", "--name-only"])
            .await?;
        Ok(parse_file_list(&stdout))
    }

    async fn stage(&self, files: &[String]) -> Result<StageReport> {
        if files.is_empty() {
            log::debug!("No files to stage");
            return Ok(StageReport::default());
        }

        let mut args = vec!["add", "--ignore-errors"];
        args.extend(files.iter().map(String::as_str));

        // Exit status is not inspected; rejected paths end up in the report.
        let output = self.run_git(&args).await?;
        let report = StageReport::from_diagnostics(files, &String::from_utf8_lossy(&output.stderr));
        log::debug!(
            "Staged {} file(s), skipped {}: {:?}",
            report.staged.len(),
            report.skipped.len(),
            report.skipped
        );
        Ok(report)
    }

    async fn set_config(&self, name: &str, value: &str) -> Result<()> {
        self.run_git_checked(&["config", name, value]).await?;
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<()> {
        self.run_git_checked(&["commit", "-m", message]).await?;
        Ok(())
    }

    async fn push(&self, target: &RemoteTarget) -> Result<()> {
        // Neither arguments nor output are logged: the URL may carry credentials.
        log::debug!("Pushing HEAD and tags to branch {}", target.branch());
        let refspec = target.refspec();
        let output = self
            .command(&["push", "--tags", target.url.as_str(), refspec.as_str()])
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => Ok(()),
            _ => Err(GitError::PushFailed {
                branch: target.branch.clone(),
            }
            .into()),
        }
    }

    async fn head_commit_id(&self) -> Result<String> {
        let output = self
            .run_git(&["rev-parse", "HEAD"])
            .await
            .map_err(|e| GitError::HeadUnavailable {
                diagnostic: e.to_string(),
            })?;

        if !output.status.success() {
            let diagnostic = failure_reason(&output);
            log::debug!("git rev-parse HEAD failed: {}", diagnostic);
            return Err(GitError::HeadUnavailable { diagnostic }.into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Keeps non-ASCII names literal in path listings.
const UNQUOTED_PATHS: &str = "core.quotePath=false";

/// Split newline-delimited git output into trimmed, non-empty entries.
///
/// Entries git still C-quotes (control characters, `"` or `\` in the name)
/// are unquoted back into the real path.
pub fn parse_file_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(unquote_path)
        .collect()
}

fn unquote_path(entry: &str) -> String {
    let quoted = match entry.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) => inner,
        None => return entry.to_string(),
    };

    let mut bytes = Vec::with_capacity(quoted.len());
    let mut chars = quoted.bytes().peekable();
    while let Some(b) = chars.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match chars.next() {
            Some(b'n') => bytes.push(b'\n'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b'f') => bytes.push(0x0c),
            Some(b'v') => bytes.push(0x0b),
            Some(d @ b'0'..=b'7') => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&o @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(o - b'0');
                            chars.next();
                        }
                        _ => break,
                    }
                }
                bytes.push((value & 0xff) as u8);
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Render an invocation for logs and errors. Config values are replaced,
/// since keys like `http.extraheader` carry tokens.
fn describe(args: &[&str]) -> String {
    // Skip leading `-c <setting>` pairs to find the subcommand.
    let mut subcommand = 0;
    while args.get(subcommand) == Some(&"-c") {
        subcommand += 2;
    }

    let rendered: Vec<&str> = args
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            if args.get(subcommand) == Some(&"config") && i == subcommand + 2 {
                "<redacted>"
            } else {
                *arg
            }
        })
        .collect();
    format!("git {}", rendered.join(" "))
}

/// Prefer stderr; git reports some failures (e.g. "nothing to commit") on stdout.
fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !stdout.is_empty() {
        return stdout;
    }
    format!("git exited with {}", output.status)
}
