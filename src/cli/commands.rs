//! Command execution functions.
//!
//! Each subcommand maps to one gateway operation, except `release`, which
//! runs the composed [`ReleaseCommitter`] step.

use crate::cli::{validate_args, Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::git::{
    CommitIdentity, GitGateway, GitOperations, ReleaseCommitRequest, ReleaseCommitter,
    RemoteTarget, RepoContext, SkipReason,
};

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(e) = validate_args(&args) {
        eprintln!("❌ {}", e);
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = run(&args.command, &config).await;

    match result {
        Ok(()) => {
            config.verbose_println(&format!("Command '{}' completed successfully", args.command.name()));
            Ok(0)
        }
        Err(e) => {
            config.error_println(&format!("Command '{}' failed: {}", args.command.name(), e));

            if config.is_verbose() {
                let suggestions = e.recovery_suggestions();
                if !suggestions.is_empty() {
                    eprintln!("\n💡 Recovery suggestions:");
                    for suggestion in suggestions {
                        eprintln!("  • {}", suggestion);
                    }
                }
            }

            Ok(1)
        }
    }
}

async fn run(command: &Command, config: &RuntimeConfig) -> Result<()> {
    // Listing and release filters work on root-relative paths; every other
    // command resolves its arguments against -C, as git does.
    let reroot = matches!(command, Command::Modified | Command::Release { .. });
    let gateway = GitGateway::new(open_context(config, reroot).await?);

    match command {
        Command::Modified => execute_modified(&gateway, config).await,
        Command::Stage { files } => execute_stage(&gateway, files, config).await,
        Command::Config { name, value } => {
            gateway.set_config(name, value).await?;
            config.success_println(&format!("Set {}", name));
            Ok(())
        }
        Command::Commit { message } => {
            gateway.commit(message).await?;
            config.success_println("Committed staged changes");
            Ok(())
        }
        Command::Push { remote_url, branch } => {
            let target = RemoteTarget::new(remote_url.as_str(), branch.as_str());
            gateway.push(&target).await?;
            config.success_println(&format!("Pushed to branch {}", branch));
            Ok(())
        }
        Command::Head => execute_head(&gateway, config).await,
        Command::Release { .. } => execute_release(gateway, command, config).await,
    }
}

/// Build the repository context, re-rooted at the work tree top level when
/// `reroot` is set.
async fn open_context(config: &RuntimeConfig, reroot: bool) -> Result<RepoContext> {
    let context = match &config.git_executable {
        Some(git) => RepoContext::with_executable(&config.repo_path, git.clone())?,
        None => RepoContext::new(&config.repo_path)?,
    };
    config.verbose_println(&format!("Using git at {}", context.executable().display()));
    if reroot {
        context.into_toplevel().await
    } else {
        Ok(context)
    }
}

async fn execute_modified(gateway: &GitGateway, config: &RuntimeConfig) -> Result<()> {
    let files = gateway.list_modified_files().await?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&files)?);
    } else {
        for file in &files {
            println!("{}", file);
        }
    }
    Ok(())
}

async fn execute_stage(gateway: &GitGateway, files: &[String], config: &RuntimeConfig) -> Result<()> {
    let report = gateway.stage(files).await?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    config.success_println(&format!("Staged {} file(s)", report.staged.len()));
    for skipped in &report.skipped {
        let reason = match &skipped.reason {
            SkipReason::Ignored => "ignored".to_string(),
            SkipReason::Rejected(detail) | SkipReason::Aborted(detail) => detail.clone(),
        };
        config.warning_println(&format!("Skipped {}: {}", skipped.path, reason));
    }
    Ok(())
}

async fn execute_head(gateway: &GitGateway, config: &RuntimeConfig) -> Result<()> {
    let head = gateway.head_commit_id().await?;

    if config.json {
        println!("{}", serde_json::json!({ "head": head }));
    } else {
        println!("{}", head);
    }
    Ok(())
}

async fn execute_release(gateway: GitGateway, command: &Command, config: &RuntimeConfig) -> Result<()> {
    if let Command::Release {
        message,
        paths,
        author_name,
        author_email,
        remote_url,
        branch,
    } = command
    {
        let identity = match (author_name, author_email) {
            (Some(name), Some(email)) => Some(CommitIdentity {
                name: name.clone(),
                email: email.clone(),
            }),
            _ => None,
        };
        let remote = match (remote_url, branch) {
            (Some(url), Some(branch)) => Some(RemoteTarget::new(url.as_str(), branch.as_str())),
            _ => None,
        };

        let request = ReleaseCommitRequest {
            message: message.clone(),
            paths: paths.clone(),
            identity,
            remote,
        };

        config.verbose_println("Running release commit step...");
        let outcome = ReleaseCommitter::new(gateway).commit_release(&request).await?;

        if config.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else if !outcome.committed {
            config.warning_println("Nothing to commit");
        } else {
            config.success_println(&format!(
                "Committed {} file(s) as {}",
                outcome.stage_report.staged.len(),
                outcome.head_after.as_deref().unwrap_or("unknown")
            ));
            if outcome.pushed {
                config.success_println("Pushed release commit and tags");
            }
        }
    }
    Ok(())
}
