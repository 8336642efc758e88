//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation and
//! the runtime configuration derived from it.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release Git - git plumbing for release automation
#[derive(Parser, Debug)]
#[command(
    name = "release_git",
    version,
    about = "Git plumbing for release automation",
    long_about = "Release Git runs the repository steps of a release: list modified files,
stage them, configure an identity, commit, push HEAD and tags, and report the
head commit. Push failures never echo the remote URL or git's output."
)]
pub struct Args {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors and requested data
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Run as if started in PATH (defaults to current directory). `modified`
    /// and `release` report and filter paths relative to the work tree root
    #[arg(short = 'C', long = "repo", global = true, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Git executable to use instead of the one found on PATH
    #[arg(long, global = true, value_name = "PATH")]
    pub git: Option<PathBuf>,

    /// Format output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List modified and untracked files that are not ignored
    Modified,

    /// Add files to the index, skipping paths git rejects
    Stage {
        /// Files to stage
        #[arg(required = true, value_name = "FILE")]
        files: Vec<String>,
    },

    /// Set a repository-local configuration value
    Config {
        /// Configuration key, e.g. user.email
        name: String,
        /// Value to set
        value: String,
    },

    /// Commit the staged changes
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,
    },

    /// Push HEAD and all tags to a branch on a remote
    Push {
        /// Remote URL (may embed credentials; never printed)
        #[arg(value_name = "REMOTE_URL")]
        remote_url: String,
        /// Target branch on the remote
        branch: String,
    },

    /// Print the head commit id
    Head,

    /// Stage modified files, commit them and optionally push
    Release {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Only commit modified files at or beneath these paths
        #[arg(long = "path", value_name = "PATH")]
        paths: Vec<String>,

        /// Author name configured before committing
        #[arg(long, value_name = "NAME", requires = "author_email")]
        author_name: Option<String>,

        /// Author email configured before committing
        #[arg(long, value_name = "EMAIL", requires = "author_name")]
        author_email: Option<String>,

        /// Remote URL to push to
        #[arg(long, value_name = "URL", requires = "branch")]
        remote_url: Option<String>,

        /// Branch to push to
        #[arg(long, value_name = "BRANCH", requires = "remote_url")]
        branch: Option<String>,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get repository path or default to current directory
    pub fn repo_path(&self) -> PathBuf {
        self.repo.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot specify both --verbose and --quiet".to_string());
        }

        if let Some(ref repo) = self.repo {
            if !repo.is_dir() {
                return Err(format!("Repository path is not a directory: {}", repo.display()));
            }
        }

        match &self.command {
            Command::Commit { message } | Command::Release { message, .. } => {
                if message.trim().is_empty() {
                    return Err("Commit message cannot be empty".to_string());
                }
            }
            Command::Config { name, .. } => {
                if !name.contains('.') {
                    return Err(format!("Config key '{}' must be of the form section.key", name));
                }
            }
            Command::Push { branch, .. } => {
                if branch.trim().is_empty() {
                    return Err("Branch cannot be empty".to_string());
                }
            }
            _ => {}
        }

        Ok(())
    }
}

impl Command {
    /// Get the command name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Command::Modified => "modified",
            Command::Stage { .. } => "stage",
            Command::Config { .. } => "config",
            Command::Commit { .. } => "commit",
            Command::Push { .. } => "push",
            Command::Head => "head",
            Command::Release { .. } => "release",
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Repository path
    pub repo_path: PathBuf,
    /// Explicit git executable
    pub git_executable: Option<PathBuf>,
    /// Verbosity level
    pub verbosity: VerbosityLevel,
    /// Whether to print JSON
    pub json: bool,
}

/// Verbosity level for output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Minimal output, only errors
    Quiet,
    /// Standard output level
    Normal,
    /// Detailed output with debug information
    Verbose,
}

impl VerbosityLevel {
    /// Default log filter for this verbosity, overridable through `RUST_LOG`
    pub fn log_level(self) -> log::LevelFilter {
        match self {
            VerbosityLevel::Quiet => log::LevelFilter::Error,
            VerbosityLevel::Normal => log::LevelFilter::Warn,
            VerbosityLevel::Verbose => log::LevelFilter::Debug,
        }
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let verbosity = if args.quiet {
            VerbosityLevel::Quiet
        } else if args.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        };

        Self {
            repo_path: args.repo_path(),
            git_executable: args.git.clone(),
            verbosity,
            json: args.json,
        }
    }
}

impl RuntimeConfig {
    /// Check if output should be suppressed
    pub fn is_quiet(&self) -> bool {
        self.verbosity == VerbosityLevel::Quiet
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbosity == VerbosityLevel::Verbose
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) {
        if self.is_verbose() {
            eprintln!("🔍 {}", message);
        }
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        eprintln!("❌ {}", message);
    }

    /// Print warning message if not in quiet mode
    pub fn warning_println(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠️ {}", message);
        }
    }

    /// Print success message if not in quiet mode
    pub fn success_println(&self, message: &str) {
        if !self.is_quiet() {
            println!("✅ {}", message);
        }
    }
}
