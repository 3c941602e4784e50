use colored::*;
use std::path::Path;

use crate::common::errors::{FailureKind, FsError};
use crate::common::format::{self, format_path, format_size};
use crate::common::permissions;
use crate::duplicates::{Disposition, ResolutionOutcome, RunSummary};

/// Banner printed before the scan starts
pub fn print_run_header(root: &Path, disposition: &Disposition, dry_run: bool) {
    println!();
    println!(
        "  {} Scanning for duplicates in: {}",
        "🔍",
        format_path(root).cyan()
    );
    let action = match disposition {
        Disposition::Delete => "delete".red().to_string(),
        Disposition::Quarantine(dir) => format!("move to {}", format_path(dir).cyan()),
    };
    println!(
        "  {} Duplicates will be: {}{}",
        "⚙".dimmed(),
        action,
        if dry_run { " (dry run)".yellow().to_string() } else { String::new() }
    );
    println!();
}

/// Operator-facing message for an unusable target folder
pub fn target_error_message(err: &FsError) -> String {
    match err.kind() {
        FailureKind::NotFound => {
            format!("The folder '{}' does not exist.", err.path().display())
        }
        FailureKind::PermissionDenied => format!(
            "No read access to the folder '{}'. {}",
            err.path().display(),
            permissions::permission_hint(err.path())
        ),
        FailureKind::Unexpected => format!(
            "Cannot scan '{}': {}",
            err.path().display(),
            err.io_error()
        ),
    }
}

/// Print why the target cannot be scanned. The run ends normally after this.
pub fn print_target_error(err: &FsError) {
    println!("{} {}", "Error:".red().bold(), target_error_message(err));
}

/// Print the run summary in human-readable form
pub fn print_summary(summary: &RunSummary) {
    let report = &summary.resolution;

    println!();
    println!("{}", "─".repeat(60).dimmed());
    println!(
        "  Scanned {} in {}  •  {} fingerprinted  •  {} skipped",
        format::format_count(summary.scan.entries_seen).cyan(),
        format::format_duration(summary.duration_secs).cyan(),
        summary.scan.hashed,
        summary.scan.skipped()
    );
    println!(
        "  {} duplicate groups  •  {} unique files",
        summary.duplicate_groups().to_string().bold(),
        report.unique_files
    );
    println!("{}", "─".repeat(60).dimmed());

    if summary.dry_run {
        println!(
            "  {} Dry run: {} would be handled, nothing was changed",
            "ℹ️",
            format::format_count(report.planned())
        );
    } else {
        match summary.disposition {
            Disposition::Delete => println!(
                "  {} Deleted {}, freed {}",
                "✓".green(),
                format::format_count(report.deleted()),
                format_size(report.bytes_freed()).green()
            ),
            Disposition::Quarantine(ref dir) => println!(
                "  {} Moved {} to {} ({})",
                "✓".green(),
                format::format_count(report.moved()),
                format_path(dir).cyan(),
                format_size(report.bytes_freed())
            ),
        }
    }

    let hash_failures = summary.scan.hash_failures;
    if report.failed() > 0 || hash_failures > 0 {
        println!(
            "  {} {} could not be handled, {} could not be read (see history log)",
            "⚠".yellow(),
            format::format_count(report.failed()).yellow(),
            format::format_count(hash_failures).yellow()
        );
        for file in report.outcomes() {
            if let ResolutionOutcome::Failed { reason, .. } = &file.outcome {
                println!("    {} {}", "→".dimmed(), reason.dimmed());
            }
        }
    }
    println!();
}

/// Print the run summary as JSON
pub fn print_summary_json(summary: &RunSummary) {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing summary: {}", e),
    }
}

/// groups, handled files, failures, bytes freed
pub fn print_summary_quiet(summary: &RunSummary) {
    let report = &summary.resolution;
    let handled = report.deleted() + report.moved() + report.planned();
    println!(
        "{}  {}  {}  {}",
        summary.duplicate_groups(),
        handled,
        report.failed(),
        format_size(report.bytes_freed())
    );
}
