use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

use super::grouper::{DuplicateGroup, FingerprintIndex};
use super::hasher::Fingerprint;
use crate::common::errors::{FailureKind, FsError, IoResultExt};
use crate::logging::Reporter;

/// What happens to redundant files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Remove from disk
    Delete,
    /// Move into this directory, flat
    Quarantine(PathBuf),
}

/// Resolver settings
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub disposition: Disposition,
    /// Record successful actions in the history log
    pub audit: bool,
    /// Report what would happen without touching the filesystem
    pub dry_run: bool,
}

impl ResolveOptions {
    pub fn delete() -> Self {
        Self {
            disposition: Disposition::Delete,
            audit: false,
            dry_run: false,
        }
    }

    pub fn quarantine(dir: impl Into<PathBuf>) -> Self {
        Self {
            disposition: Disposition::Quarantine(dir.into()),
            audit: false,
            dry_run: false,
        }
    }
}

/// Result for a single redundant file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Deleted,
    Moved { to: PathBuf },
    /// Dry run: `to` is the quarantine target, absent for deletes
    Planned { to: Option<PathBuf> },
    Failed { kind: FailureKind, reason: String },
}

impl ResolutionOutcome {
    fn failed(err: &FsError) -> Self {
        ResolutionOutcome::Failed {
            kind: err.kind(),
            reason: err.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ResolutionOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedFile {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: ResolutionOutcome,
}

/// One duplicate group after resolution
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedGroup {
    pub fingerprint: Fingerprint,
    /// The canonical file, never touched
    pub keep: PathBuf,
    pub files: Vec<ResolvedFile>,
    pub size_bytes: u64,
}

impl ResolvedGroup {
    /// Bytes no longer held in the scanned directory
    pub fn bytes_freed(&self) -> u64 {
        let done = self
            .files
            .iter()
            .filter(|f| {
                matches!(
                    f.outcome,
                    ResolutionOutcome::Deleted | ResolutionOutcome::Moved { .. }
                )
            })
            .count();
        self.size_bytes * done as u64
    }
}

/// Everything the resolver did
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionReport {
    pub groups: Vec<ResolvedGroup>,
    /// Fingerprints with a single file; nothing to do for them
    pub unique_files: usize,
}

impl ResolutionReport {
    pub fn outcomes(&self) -> impl Iterator<Item = &ResolvedFile> {
        self.groups.iter().flat_map(|g| g.files.iter())
    }

    pub fn deleted(&self) -> usize {
        self.count(|o| matches!(o, ResolutionOutcome::Deleted))
    }

    pub fn moved(&self) -> usize {
        self.count(|o| matches!(o, ResolutionOutcome::Moved { .. }))
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, ResolutionOutcome::Planned { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(ResolutionOutcome::is_failure)
    }

    pub fn bytes_freed(&self) -> u64 {
        self.groups.iter().map(ResolvedGroup::bytes_freed).sum()
    }

    fn count(&self, pred: impl Fn(&ResolutionOutcome) -> bool) -> usize {
        self.outcomes().filter(|f| pred(&f.outcome)).count()
    }
}

/// Keep the first file of every group and dispose of the rest.
///
/// Each file is handled on its own: a failure is reported and the loop moves
/// on. Nothing already done is rolled back.
pub fn resolve(
    index: FingerprintIndex,
    dir: &Path,
    options: &ResolveOptions,
    reporter: &Reporter,
) -> ResolutionReport {
    let (groups, _stats) = index.into_parts();
    let mut report = ResolutionReport::default();

    // Quarantine dir is prepared once, before the first move
    let quarantine = match &options.disposition {
        Disposition::Quarantine(target) if !options.dry_run => {
            Some(prepare_quarantine(target).map_err(|e| {
                reporter.failed(&e);
                e
            }))
        }
        _ => None,
    };

    for group in groups {
        if !group.is_duplicate() {
            report.unique_files += 1;
            continue;
        }

        reporter.duplicate_found(&group);
        let resolved = resolve_group(group, dir, options, quarantine.as_ref(), reporter);
        report.groups.push(resolved);
    }

    if report.groups.is_empty() {
        reporter.no_duplicates();
    }

    report
}

fn resolve_group(
    group: DuplicateGroup,
    dir: &Path,
    options: &ResolveOptions,
    quarantine: Option<&Result<(), FsError>>,
    reporter: &Reporter,
) -> ResolvedGroup {
    let mut files = Vec::with_capacity(group.redundant().len());

    for name in group.redundant() {
        let path = dir.join(name);
        let outcome = match &options.disposition {
            Disposition::Delete => {
                if options.dry_run {
                    reporter.planned(&path, None);
                    ResolutionOutcome::Planned { to: None }
                } else {
                    match std::fs::remove_file(&path).at_path(&path) {
                        Ok(()) => {
                            reporter.deleted(&path, options.audit);
                            ResolutionOutcome::Deleted
                        }
                        Err(e) => {
                            reporter.failed(&e);
                            ResolutionOutcome::failed(&e)
                        }
                    }
                }
            }
            Disposition::Quarantine(target_dir) => {
                let target = quarantine_target(target_dir, name, &group.fingerprint);
                if options.dry_run {
                    reporter.planned(&path, Some(&target));
                    ResolutionOutcome::Planned { to: Some(target) }
                } else {
                    match quarantine {
                        Some(Err(e)) => ResolutionOutcome::failed(e),
                        _ => match move_file(&path, &target) {
                            Ok(()) => {
                                reporter.moved(&path, &target, options.audit);
                                ResolutionOutcome::Moved { to: target }
                            }
                            Err(e) => {
                                reporter.failed(&e);
                                ResolutionOutcome::failed(&e)
                            }
                        },
                    }
                }
            }
        };
        files.push(ResolvedFile { path, outcome });
    }

    ResolvedGroup {
        keep: dir.join(group.canonical()),
        fingerprint: group.fingerprint,
        files,
        size_bytes: group.size_bytes,
    }
}

/// Create the quarantine directory if it does not exist yet
fn prepare_quarantine(dir: &Path) -> Result<(), FsError> {
    if !dir.is_dir() {
        std::fs::create_dir_all(dir).at_path(dir)?;
        tracing::debug!("Created quarantine directory {}", dir.display());
    }
    Ok(())
}

/// Where `name` lands inside the quarantine directory.
///
/// An existing file is never overwritten: on a name clash the short
/// fingerprint is inserted before the extension (`report.1a2b3c4d.pdf`), and
/// if that is taken too a counter is added (`report.1a2b3c4d-2.pdf`).
pub fn quarantine_target(dir: &Path, name: &Path, fingerprint: &Fingerprint) -> PathBuf {
    let plain = dir.join(name);
    if !occupied(&plain) {
        return plain;
    }

    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name.extension().map(|e| e.to_string_lossy().into_owned());
    let base = format!("{}.{}", stem, fingerprint.short());

    let mut n = 0usize;
    loop {
        let stem = if n == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, n)
        };
        let candidate = match &ext {
            Some(ext) => dir.join(format!("{}.{}", stem, ext)),
            None => dir.join(stem),
        };
        if !occupied(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// True for anything at `path`, including dangling symlinks
fn occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Rename, falling back to copy + remove when rename cannot cross filesystems
fn move_file(from: &Path, to: &Path) -> Result<(), FsError> {
    let err = match std::fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    if matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    ) {
        return Err(FsError::from_io(from, err));
    }

    // Only a target this move created may be cleaned up afterwards
    let target_was_free = !occupied(to);
    if let Err(e) = std::fs::copy(from, to) {
        if target_was_free {
            discard_partial_copy(to);
        }
        return Err(FsError::from_io(from, e));
    }
    if let Err(e) = std::fs::remove_file(from) {
        // Leave exactly one copy behind
        discard_partial_copy(to);
        return Err(FsError::from_io(from, e));
    }
    Ok(())
}

fn discard_partial_copy(to: &Path) {
    match std::fs::remove_file(to) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "Could not remove incomplete copy {}: {}",
            to.display(),
            e
        ),
    }
}
