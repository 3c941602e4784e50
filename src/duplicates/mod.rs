pub mod grouper;
pub mod hasher;
pub mod resolver;

pub use grouper::{scan, DuplicateGroup, FingerprintIndex, ScanOptions, ScanStats, SkipReason};
pub use hasher::{fingerprint, fingerprint_path, Fingerprint};
pub use resolver::{
    resolve, Disposition, ResolutionOutcome, ResolutionReport, ResolveOptions, ResolvedFile,
    ResolvedGroup,
};

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::common::errors::{FsError, IoResultExt};
use crate::logging::{self, Reporter};

/// Settings for a full scan-then-resolve pass
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub scan: ScanOptions,
    pub resolve: ResolveOptions,
}

/// Complete results of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub root: PathBuf,
    pub started_at: DateTime<Local>,
    pub duration_secs: f64,
    pub disposition: Disposition,
    pub dry_run: bool,
    pub scan: ScanStats,
    /// Distinct fingerprints seen
    pub fingerprints: usize,
    pub resolution: ResolutionReport,
}

impl RunSummary {
    pub fn duplicate_groups(&self) -> usize {
        self.resolution.groups.len()
    }
}

/// The target must exist and be a listable directory.
pub fn check_target(dir: &Path) -> Result<(), FsError> {
    let meta = std::fs::metadata(dir).at_path(dir)?;
    if !meta.is_dir() {
        return Err(FsError::from_io(
            dir,
            std::io::Error::other("not a directory"),
        ));
    }
    std::fs::read_dir(dir).at_path(dir)?;
    Ok(())
}

/// Scan `dir`, then resolve every duplicate group found.
///
/// Fails only when the target itself is unusable, in which case nothing is
/// scanned and nothing on disk changes. Per-file problems end up in the
/// summary instead.
pub fn run(dir: &Path, options: &RunOptions, reporter: &Reporter) -> Result<RunSummary, FsError> {
    let started_at = Local::now();
    let start = Instant::now();

    if let Err(e) = check_target(dir) {
        logging::record_failure(&e);
        return Err(e);
    }

    tracing::debug!("Scanning {} for duplicates", dir.display());
    let index = scan(dir, &options.scan, reporter);
    let stats = index.stats().clone();
    let fingerprints = index.len();

    let resolution = resolve(index, dir, &options.resolve, reporter);

    Ok(RunSummary {
        root: dir.to_path_buf(),
        started_at,
        duration_secs: start.elapsed().as_secs_f64(),
        disposition: options.resolve.disposition.clone(),
        dry_run: options.resolve.dry_run,
        scan: stats,
        fingerprints,
        resolution,
    })
}
