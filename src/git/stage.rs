//! Classification of `git add --ignore-errors` results.
//!
//! Git keeps going when individual paths are rejected, so the outcome of a
//! stage call is recovered from its diagnostics rather than its exit status.

use serde::Serialize;

const IGNORED_HEADER: &str = "The following paths are ignored by";

/// Why a requested path did not make it into the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Path matched an ignore rule
    Ignored,
    /// Git reported an error for this path and moved on
    Rejected(String),
    /// Git aborted the whole add, nothing was staged
    Aborted(String),
}

/// A requested path that was not staged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPath {
    /// Path as the caller passed it
    pub path: String,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// Outcome of a best-effort stage call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageReport {
    /// Paths git accepted, in request order
    pub staged: Vec<String>,
    /// Paths git skipped, in request order
    pub skipped: Vec<SkippedPath>,
}

impl StageReport {
    /// Classify `requested` paths against the stderr of `git add --ignore-errors`.
    pub fn from_diagnostics(requested: &[String], stderr: &str) -> Self {
        if let Some(fatal) = stderr.lines().find_map(|line| line.strip_prefix("fatal: ")) {
            return Self {
                staged: Vec::new(),
                skipped: requested
                    .iter()
                    .map(|path| SkippedPath {
                        path: path.clone(),
                        reason: SkipReason::Aborted(fatal.trim().to_string()),
                    })
                    .collect(),
            };
        }

        let ignored = ignored_paths(stderr);
        let rejected = rejected_paths(stderr);

        let mut report = Self::default();
        for path in requested {
            let key = normalize(path);
            let reason = if ignored.iter().any(|p| normalize(p) == key) {
                Some(SkipReason::Ignored)
            } else {
                rejected
                    .iter()
                    .find(|(p, _)| normalize(p) == key)
                    .map(|(_, line)| SkipReason::Rejected(line.clone()))
            };

            match reason {
                Some(reason) => report.skipped.push(SkippedPath {
                    path: path.clone(),
                    reason,
                }),
                None => report.staged.push(path.clone()),
            }
        }
        report
    }

    /// True when at least one path was staged
    pub fn has_staged(&self) -> bool {
        !self.staged.is_empty()
    }
}

/// Entries of the "paths are ignored" block, which ends at the first hint.
fn ignored_paths(stderr: &str) -> Vec<String> {
    stderr
        .lines()
        .skip_while(|line| !line.starts_with(IGNORED_HEADER))
        .skip(1)
        .take_while(|line| !line.starts_with("hint:") && !line.starts_with("error:"))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// `error:` lines naming a quoted path, e.g. `error: unable to index file 'a.bin'`.
fn rejected_paths(stderr: &str) -> Vec<(String, String)> {
    stderr
        .lines()
        .filter_map(|line| line.strip_prefix("error: "))
        .filter_map(|detail| {
            let start = detail.find('\'')?;
            let end = detail[start + 1..].find('\'')? + start + 1;
            Some((detail[start + 1..end].to_string(), detail.to_string()))
        })
        .collect()
}

fn normalize(path: &str) -> &str {
    let path = path.strip_prefix("./").unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}
