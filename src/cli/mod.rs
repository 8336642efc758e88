//! Command line interface for release_git.
//!
//! This module provides the CLI for running release git steps, with argument
//! parsing, logging setup and command execution.

mod args;
mod commands;

pub use args::{Args, Command, RuntimeConfig, VerbosityLevel};
pub use commands::execute_command;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    init_logging(RuntimeConfig::from(&args).verbosity);
    execute_command(args).await
}

/// Install the env_logger backend. `RUST_LOG` takes precedence over the
/// verbosity flags.
pub fn init_logging(verbosity: VerbosityLevel) {
    let _ = env_logger::Builder::new()
        .filter_level(verbosity.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}

/// Validate arguments before any git command runs
pub fn validate_args(args: &Args) -> Result<()> {
    args.validate()
        .map_err(|e| crate::error::CliError::InvalidArguments { reason: e }.into())
}
