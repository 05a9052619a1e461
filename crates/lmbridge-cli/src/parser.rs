//! Top-level argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Fetch on-device models and chat with them through the native engine.
#[derive(Parser)]
#[command(name = "lmbridge")]
#[command(about = "Fetch on-device models and chat with them")]
#[command(version = lmbridge_build_info::LONG_VERSION)]
pub struct Cli {
    /// Override the model root for this invocation
    #[arg(long = "model-root", global = true)]
    pub model_root: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_args() {
        let cli = Cli::parse_from(["lmbridge", "find", "m", "-v", "--model-root", "/tmp/models"]);
        assert!(cli.verbose);
        assert_eq!(cli.model_root, Some(PathBuf::from("/tmp/models")));
        assert!(matches!(cli.command, Commands::Find { ref model } if model == "m"));
    }
}
