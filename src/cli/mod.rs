//! Command-line interface layer.

mod args;
mod exit_status;
mod run;

use anyhow::Result;

pub use args::{Arguments, Command, CommonArgs, StatusCommand, SyncCommand};
pub use exit_status::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };
    run::run(args)
}
