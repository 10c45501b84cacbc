//! Console reporting for sync runs.

use colored::Colorize;

use crate::sync::SyncResult;

/// Colored console reporter.
///
/// All run output goes through here so commands stay free of formatting
/// concerns. `verbose` adds per-file detail.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    pub verbose: bool,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "error:".red().bold(), message);
    }

    /// Print the summary of a sync run.
    pub fn print_sync_result(&self, result: &SyncResult, dry_run: bool) {
        for (path, message) in &result.parse_errors {
            self.warn(&format!("failed to parse {}: {}", path.display(), message));
        }
        for message in &result.plugin_errors {
            self.warn(message);
        }
        for (path, message) in &result.file_errors {
            self.error(&format!("{}: {}", path.display(), message));
        }
        for conflict in &result.conflicts {
            self.error(&format!(
                "conflict in {}:{} at key \"{}\": {}",
                conflict.locale, conflict.namespace, conflict.key, conflict.reason
            ));
        }

        if !result.conflicts.is_empty() {
            self.error("aborted: no files were written");
            return;
        }

        println!(
            "Scanned {} source file{}, found {} key{}.",
            result.files_scanned,
            plural_s(result.files_scanned),
            result.keys_found,
            plural_s(result.keys_found),
        );

        for file in &result.files {
            if !file.changed && !self.verbose {
                continue;
            }
            let status = if !file.changed {
                "unchanged".dimmed()
            } else if dry_run {
                "would update".yellow()
            } else {
                "updated".green()
            };
            println!(
                "  {} {} (+{} -{})",
                status,
                file.path.display(),
                file.added,
                file.removed
            );
        }

        if result.changed {
            let verb = if dry_run { "needs" } else { "applied" };
            println!("{} {} update.", "sync".bold(), verb);
        } else {
            println!("{} no update needed.", "sync".bold());
        }
    }
}

fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
