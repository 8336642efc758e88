//! Git operations for release workflows.
//!
//! Every operation is a single invocation of the `git` executable against an
//! explicit [`RepoContext`]. Nothing is cached between calls and no operation
//! retries.

mod context;
mod manager;
mod operations;
mod stage;

pub use context::{RepoContext, GIT_EXECUTABLE};
pub use manager::{CommitIdentity, ReleaseCommitOutcome, ReleaseCommitRequest, ReleaseCommitter};
pub use operations::{parse_file_list, GitGateway, GitOperations, RemoteTarget};
pub use stage::{SkipReason, SkippedPath, StageReport};
