//! Release Git - git plumbing for release automation.
//!
//! This binary exposes each repository step of a release as a subcommand.

use release_git::cli;
use std::process;

#[tokio::main]
async fn main() {
    let result = cli::run().await;

    match result {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("❌ Fatal error: {}", e);

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                eprintln!("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    eprintln!("  • {}", suggestion);
                }
            }

            process::exit(1);
        }
    }
}
