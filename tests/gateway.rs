//! Tests for the git gateway against real throwaway repositories

use release_git::{GitError, GitGateway, GitOperations, ReleaseError, RemoteTarget, RepoContext, SkipReason};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git should be installed");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

async fn init_repo() -> (TempDir, GitGateway) {
    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init", "-q"]);
    let gateway = GitGateway::open(dir.path()).unwrap();
    gateway.set_config("user.name", "Release Bot").await.unwrap();
    gateway.set_config("user.email", "bot@example.com").await.unwrap();
    gateway.set_config("commit.gpgsign", "false").await.unwrap();
    (dir, gateway)
}

async fn commit_file(gateway: &GitGateway, dir: &Path, name: &str, contents: &str, message: &str) {
    fs::write(dir.join(name), contents).unwrap();
    gateway.stage(&[name.to_string()]).await.unwrap();
    gateway.commit(message).await.unwrap();
}

fn is_hex_id(id: &str) -> bool {
    (id.len() == 40 || id.len() == 64) && id.chars().all(|c| c.is_ascii_hexdigit())
}

#[tokio::test]
async fn test_list_modified_files_reports_modified_and_untracked() {
    let (dir, gateway) = init_repo().await;
    fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
    fs::write(dir.path().join("a.txt"), "one\n").unwrap();
    gateway.stage(&[".gitignore".to_string(), "a.txt".to_string()]).await.unwrap();
    gateway.commit("initial").await.unwrap();

    fs::write(dir.path().join("a.txt"), "two\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "new\n").unwrap();
    fs::write(dir.path().join("debug.log"), "ignored\n").unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/guide.md"), "# guide\n").unwrap();

    let mut files = gateway.list_modified_files().await.unwrap();
    for file in &files {
        assert!(!file.is_empty());
        assert_eq!(file, file.trim());
    }
    files.sort();
    assert_eq!(files, vec!["a.txt", "docs/guide.md", "notes.txt"]);
}

#[tokio::test]
async fn test_list_modified_files_keeps_non_ascii_names_literal() {
    let (dir, gateway) = init_repo().await;
    fs::write(dir.path().join("CHANGELOG.md"), "# Changelog\n").unwrap();
    fs::write(dir.path().join("café.txt"), "menu\n").unwrap();

    let mut files = gateway.list_modified_files().await.unwrap();
    files.sort();
    assert_eq!(files, vec!["CHANGELOG.md", "café.txt"]);

    let report = gateway.stage(&files).await.unwrap();
    assert_eq!(report.staged.len(), 2);
    assert!(report.skipped.is_empty());

    let mut staged = gateway.list_staged_files().await.unwrap();
    staged.sort();
    assert_eq!(staged, vec!["CHANGELOG.md", "café.txt"]);
}

#[tokio::test]
async fn test_list_staged_files_reports_index_changes_only() {
    let (dir, gateway) = init_repo().await;
    commit_file(&gateway, dir.path(), "a.txt", "one\n", "initial").await;

    fs::write(dir.path().join("a.txt"), "two\n").unwrap();
    fs::write(dir.path().join("staged.txt"), "new\n").unwrap();
    gateway.stage(&["staged.txt".to_string()]).await.unwrap();

    assert_eq!(gateway.list_staged_files().await.unwrap(), vec!["staged.txt"]);
}

#[tokio::test]
async fn test_list_modified_files_empty_when_clean() {
    let (dir, gateway) = init_repo().await;
    commit_file(&gateway, dir.path(), "a.txt", "one\n", "initial").await;

    assert!(gateway.list_modified_files().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_modified_files_outside_repository_fails() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = GitGateway::open(dir.path()).unwrap();

    let err = gateway.list_modified_files().await.unwrap_err();
    match err {
        ReleaseError::Git(GitError::CommandFailed { operation, reason, .. }) => {
            assert_eq!(operation, "git -c core.quotePath=false ls-files -m -o --exclude-standard");
            assert!(!reason.is_empty());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_stage_skips_ignored_path_and_stages_the_rest() {
    let (dir, gateway) = init_repo().await;
    commit_file(&gateway, dir.path(), ".gitignore", "*.log\n", "ignore logs").await;

    fs::write(dir.path().join("debug.log"), "ignored\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "keep\n").unwrap();

    let report = gateway
        .stage(&["debug.log".to_string(), "notes.txt".to_string()])
        .await
        .unwrap();
    assert_eq!(report.staged, vec!["notes.txt"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, "debug.log");
    assert_eq!(report.skipped[0].reason, SkipReason::Ignored);

    gateway.commit("add notes").await.unwrap();
    let committed = git(dir.path(), &["show", "--name-only", "--format=", "HEAD"]);
    assert_eq!(committed, "notes.txt");
}

#[tokio::test]
async fn test_stage_missing_path_never_fails_the_call() {
    let (dir, gateway) = init_repo().await;
    fs::write(dir.path().join("notes.txt"), "keep\n").unwrap();

    let report = gateway
        .stage(&["missing.txt".to_string(), "notes.txt".to_string()])
        .await
        .unwrap();
    assert!(report.skipped.iter().any(|s| s.path == "missing.txt"));
}

#[tokio::test]
async fn test_stage_empty_list_is_a_no_op() {
    let (_dir, gateway) = init_repo().await;

    let report = gateway.stage(&[]).await.unwrap();
    assert!(report.staged.is_empty());
    assert!(report.skipped.is_empty());
}

#[tokio::test]
async fn test_commit_moves_head() {
    let (dir, gateway) = init_repo().await;
    commit_file(&gateway, dir.path(), "a.txt", "one\n", "initial").await;
    let before = gateway.head_commit_id().await.unwrap();

    commit_file(&gateway, dir.path(), "a.txt", "two\n", "second").await;
    let after = gateway.head_commit_id().await.unwrap();

    assert!(is_hex_id(&before));
    assert!(is_hex_id(&after));
    assert_ne!(before, after);
    assert_eq!(after, git(dir.path(), &["rev-parse", "HEAD"]));
}

#[tokio::test]
async fn test_commit_with_nothing_staged_fails() {
    let (dir, gateway) = init_repo().await;
    commit_file(&gateway, dir.path(), "a.txt", "one\n", "initial").await;

    let err = gateway.commit("empty").await.unwrap_err();
    match err {
        ReleaseError::Git(GitError::CommandFailed { code, reason, .. }) => {
            assert_eq!(code, Some(1));
            assert!(!reason.is_empty());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_set_config_enables_commit() {
    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init", "-q"]);
    let gateway = GitGateway::open(dir.path()).unwrap();

    gateway.set_config("user.name", "Release Bot").await.unwrap();
    gateway.set_config("user.email", "a@b.com").await.unwrap();
    gateway.set_config("commit.gpgsign", "false").await.unwrap();
    assert_eq!(git(dir.path(), &["config", "--local", "user.email"]), "a@b.com");

    fs::write(dir.path().join("README.md"), "hello\n").unwrap();
    gateway.stage(&["README.md".to_string()]).await.unwrap();
    gateway.commit("init").await.unwrap();

    assert_eq!(git(dir.path(), &["log", "-1", "--format=%ae %s"]), "a@b.com init");
}

#[tokio::test]
async fn test_set_config_rejects_invalid_key() {
    let (_dir, gateway) = init_repo().await;

    let err = gateway.set_config("nosection", "s3cr3t-token").await.unwrap_err();
    assert!(!err.to_string().contains("s3cr3t"));
    match err {
        ReleaseError::Git(GitError::CommandFailed { operation, .. }) => {
            assert_eq!(operation, "git config nosection <redacted>");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_head_commit_id_on_empty_repository_fails_with_diagnostic() {
    let (_dir, gateway) = init_repo().await;

    let err = gateway.head_commit_id().await.unwrap_err();
    match err {
        ReleaseError::Git(GitError::HeadUnavailable { diagnostic }) => {
            assert!(!diagnostic.is_empty());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_push_sends_head_and_tags() {
    let (dir, gateway) = init_repo().await;
    commit_file(&gateway, dir.path(), "a.txt", "one\n", "initial").await;
    git(dir.path(), &["tag", "v1.0.0"]);

    let remote = tempfile::tempdir().unwrap();
    git(remote.path(), &["init", "--bare", "-q"]);
    let url = remote.path().to_string_lossy().to_string();

    gateway.push(&RemoteTarget::new(url, "release")).await.unwrap();

    let head = gateway.head_commit_id().await.unwrap();
    assert_eq!(git(remote.path(), &["rev-parse", "refs/heads/release"]), head);
    assert_eq!(git(remote.path(), &["tag", "-l"]), "v1.0.0");
}

#[tokio::test]
async fn test_push_failure_is_redacted() {
    let (dir, gateway) = init_repo().await;
    commit_file(&gateway, dir.path(), "a.txt", "one\n", "initial").await;

    let missing = tempfile::tempdir().unwrap();
    let url = missing
        .path()
        .join("user:s3cr3t-token@nowhere")
        .to_string_lossy()
        .to_string();

    let err = gateway.push(&RemoteTarget::new(url, "main")).await.unwrap_err();
    let message = err.to_string();

    assert!(matches!(err, ReleaseError::Git(GitError::PushFailed { ref branch }) if branch == "main"));
    assert!(message.ends_with("An error occurred during the git push to the remote branch main"));
    assert!(!message.contains("s3cr3t"));
    assert!(!format!("{:?}", err).contains("s3cr3t"));
}

#[tokio::test]
async fn test_discover_reroots_at_toplevel() {
    let (dir, gateway) = init_repo().await;
    commit_file(&gateway, dir.path(), "a.txt", "one\n", "initial").await;
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/new.txt"), "x\n").unwrap();

    let context = RepoContext::discover(dir.path().join("nested")).await.unwrap();
    assert_eq!(
        fs::canonicalize(context.root()).unwrap(),
        fs::canonicalize(dir.path()).unwrap()
    );

    let files = GitGateway::new(context).list_modified_files().await.unwrap();
    assert_eq!(files, vec!["nested/new.txt"]);
}

#[tokio::test]
async fn test_discover_outside_repository_fails() {
    let dir = tempfile::tempdir().unwrap();

    let err = RepoContext::discover(dir.path()).await.unwrap_err();
    assert!(matches!(err, ReleaseError::Git(GitError::NotRepository { .. })));
}
