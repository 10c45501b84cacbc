//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `sync`: Extract keys and update every locale file
//! - `status`: Report what `sync` would change, without writing (CI gate)
//! - `init`: Create a default configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Path to the configuration file (default: discovered from the working
    /// directory upward)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print per-file detail
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract keys from source and reconcile locale files
    Sync(SyncCommand),
    /// Report pending changes without writing anything
    Status(StatusCommand),
    /// Create a default configuration file
    Init,
}

#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Compute and report everything, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Overwrite primary-locale values with the defaults found in source
    #[arg(long)]
    pub sync_primary: bool,

    /// Reset secondary-locale values to the placeholder
    #[arg(long)]
    pub sync_secondary: bool,
}

#[derive(Debug, Args)]
pub struct StatusCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_parse_sync_flags() {
        let args = Arguments::parse_from(["lokey", "sync", "--dry-run", "--sync-primary"]);
        let Some(Command::Sync(cmd)) = args.command else {
            panic!("expected sync command");
        };
        assert!(cmd.dry_run);
        assert!(cmd.sync_primary);
        assert!(!cmd.sync_secondary);
    }

    #[test]
    fn test_parse_status_with_config() {
        let args = Arguments::parse_from(["lokey", "status", "--config", "conf.json", "-v"]);
        let Some(Command::Status(cmd)) = args.command else {
            panic!("expected status command");
        };
        assert_eq!(cmd.common.config.as_deref(), Some("conf.json".as_ref()));
        assert!(cmd.common.verbose);
    }

    #[test]
    fn test_no_command() {
        let args = Arguments::parse_from(["lokey"]);
        assert!(args.command.is_none());
    }
}
