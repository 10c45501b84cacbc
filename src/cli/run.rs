//! Command dispatch.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::cli::args::{Arguments, Command, CommonArgs, StatusCommand, SyncCommand};
use crate::cli::exit_status::ExitStatus;
use crate::config::{CONFIG_FILE_NAME, default_config_json, load_config, load_config_file};
use crate::report::Reporter;
use crate::sync::{Session, SyncOptions, SyncResult};

pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Sync(cmd)) => sync(cmd),
        Some(Command::Status(cmd)) => status(cmd),
        Some(Command::Init) => {
            init()?;
            println!("Created {}", CONFIG_FILE_NAME);
            Ok(ExitStatus::Success)
        }
        None => bail!("No command provided. Use --help to see available commands."),
    }
}

fn sync(cmd: SyncCommand) -> Result<ExitStatus> {
    let options = SyncOptions {
        dry_run: cmd.dry_run,
        sync_primary: cmd.sync_primary,
        sync_secondary: cmd.sync_secondary,
        ..Default::default()
    };
    let result = run_session(&cmd.common, &options)?;

    let reporter = Reporter::new(cmd.common.verbose);
    reporter.print_sync_result(&result, cmd.dry_run);
    Ok(completion_status(&result, false))
}

fn status(cmd: StatusCommand) -> Result<ExitStatus> {
    let options = SyncOptions {
        dry_run: true,
        ..Default::default()
    };
    let result = run_session(&cmd.common, &options)?;

    let reporter = Reporter::new(cmd.common.verbose);
    reporter.print_sync_result(&result, true);
    Ok(completion_status(&result, true))
}

fn run_session(common: &CommonArgs, options: &SyncOptions) -> Result<SyncResult> {
    let cwd = env::current_dir().context("Failed to determine working directory")?;

    let loaded = match &common.config {
        Some(path) => load_config_file(path)?,
        None => load_config(&cwd)?,
    };
    let base_dir: PathBuf = loaded
        .path
        .as_deref()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(cwd);

    let session = Session::new(loaded.config, base_dir);
    session.sync(options)
}

/// A run fails when it hit conflicts or unusable resource files, and `status`
/// additionally fails when changes are pending.
fn completion_status(result: &SyncResult, fail_on_changes: bool) -> ExitStatus {
    if !result.conflicts.is_empty() || !result.file_errors.is_empty() {
        return ExitStatus::Failure;
    }
    if fail_on_changes && result.changed {
        return ExitStatus::Failure;
    }
    ExitStatus::Success
}

fn init() -> Result<()> {
    let config_path = std::path::Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        bail!("{} already exists", CONFIG_FILE_NAME);
    }
    fs::write(config_path, default_config_json()?)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;
    Ok(())
}
