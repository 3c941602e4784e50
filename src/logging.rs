//! History log and console reporting.
//!
//! [`init`] opens the append-only history file and installs a tracing
//! subscriber as the default for the current thread. The returned
//! [`LogSession`] must be held until the run is over; dropping it flushes
//! the file writer and uninstalls the subscriber.
//!
//! [`Reporter`] is what the scanner and resolver talk to. Each event goes to
//! the history log through `tracing` and, when echo is on, to stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::subscriber::DefaultGuard;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::common::errors::FsError;
use crate::common::format::{format_path, format_size};
use crate::duplicates::grouper::{DuplicateGroup, SkipReason};

/// Environment variable that overrides the history log filter
pub const LOG_FILTER_ENV: &str = "DUPSWEEP_LOG";

/// Keeps the history log open for the lifetime of a run
pub struct LogSession {
    path: PathBuf,
    _default: DefaultGuard,
    _worker: WorkerGuard,
}

impl LogSession {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Open `log_file` for appending and route `tracing` events into it.
///
/// With `verbose`, debug events are also written to stderr.
pub fn init(log_file: &Path, verbose: bool) -> Result<LogSession> {
    let dir = match log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = log_file
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", log_file.display()))?;

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log dir: {}", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy().into_owned())
        .build(&dir)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;
    let (writer, worker) = tracing_appender::non_blocking(appender);

    let file_filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(file_filter);

    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .with_filter(EnvFilter::new("dupsweep=debug"))
    });

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer);
    let default = tracing::subscriber::set_default(subscriber);

    debug!("History log opened at {}", log_file.display());

    Ok(LogSession {
        path: log_file.to_path_buf(),
        _default: default,
        _worker: worker,
    })
}

/// Write a failure to the history log as `<kind>: <io error> - <path>`
pub fn record_failure(err: &FsError) {
    error!(
        "{}: {} - {}",
        err.kind(),
        err.io_error(),
        err.path().display()
    );
}

/// Sink for everything the pipeline has to tell the operator
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    echo: bool,
}

impl Reporter {
    /// `echo` mirrors events to stdout
    pub fn new(echo: bool) -> Self {
        Self { echo }
    }

    /// Log-only reporter, for tests and machine-readable output
    pub fn silent() -> Self {
        Self { echo: false }
    }

    pub fn echoes(&self) -> bool {
        self.echo
    }

    pub fn skipped(&self, path: &Path, reason: SkipReason) {
        match reason {
            SkipReason::Hidden => {
                info!("Skipping hidden file or directory: {}", path.display())
            }
            SkipReason::Unreadable => {
                warn!("Skipping inaccessible file: {}", path.display())
            }
            SkipReason::NotAFile => {
                info!("Skipping non-regular file: {}", path.display())
            }
        }
        if self.echo {
            println!(
                "  {} {}: {}",
                "↷".dimmed(),
                reason.to_string().dimmed(),
                format_path(path).dimmed()
            );
        }
    }

    /// Failures are always logged, whatever the audit setting.
    pub fn failed(&self, err: &FsError) {
        record_failure(err);
        if self.echo {
            println!(
                "  {} {}: {}",
                "✗".red(),
                err.kind().to_string().red(),
                format_path(err.path())
            );
        }
    }

    pub fn duplicate_found(&self, group: &DuplicateGroup) {
        let names: Vec<String> = group.files.iter().map(|f| f.display().to_string()).collect();
        debug!(
            "Duplicate found with hash {}: {:?} ({} bytes redundant)",
            group.fingerprint,
            names,
            group.wasted_bytes()
        );
        if self.echo {
            println!(
                "  {} Duplicate found with hash {}: [{}] {}",
                "●".yellow(),
                group.fingerprint.short().cyan(),
                names.join(", "),
                format!("({} redundant)", format_size(group.wasted_bytes())).dimmed()
            );
        }
    }

    pub fn no_duplicates(&self) {
        debug!("No duplicates found");
        if self.echo {
            println!("  {} No duplicates found.", "✨");
        }
    }

    /// `audit` decides whether the success reaches the history log.
    pub fn deleted(&self, path: &Path, audit: bool) {
        if audit {
            info!("Deleted: {}", path.display());
        }
        if self.echo {
            println!("    {} Deleted {}", "✓".green(), format_path(path));
        }
    }

    pub fn moved(&self, from: &Path, to: &Path, audit: bool) {
        if audit {
            info!("Moved '{}' to '{}'", from.display(), to.display());
        }
        if self.echo {
            println!(
                "    {} Moved {} → {}",
                "✓".green(),
                format_path(from),
                format_path(to).dimmed()
            );
        }
    }

    pub fn planned(&self, path: &Path, target: Option<&Path>) {
        debug!("Dry run, would dispose of {}", path.display());
        if self.echo {
            match target {
                Some(to) => println!(
                    "    {} Would move {} → {}",
                    "○".cyan(),
                    format_path(path),
                    format_path(to).dimmed()
                ),
                None => println!("    {} Would delete {}", "○".cyan(), format_path(path)),
            }
        }
    }
}
