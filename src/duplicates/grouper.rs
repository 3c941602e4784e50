use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::hasher::{self, Fingerprint};
use crate::common::config::Config;
use crate::common::errors::IoResultExt;
use crate::common::permissions;
use crate::logging::Reporter;

/// How the scanner filters and orders entries
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Entry names starting with any of these are skipped
    pub hidden_prefixes: Vec<String>,
    /// Sort entries by name instead of trusting directory order
    pub sort_entries: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ScanOptions {
    fn from(config: &Config) -> Self {
        Self {
            hidden_prefixes: config.hidden_prefixes.clone(),
            sort_entries: config.sort_entries,
        }
    }
}

impl ScanOptions {
    fn is_hidden(&self, name: &str) -> bool {
        self.hidden_prefixes
            .iter()
            .any(|p| !p.is_empty() && name.starts_with(p.as_str()))
    }
}

/// Why an entry never reached the hasher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Name starts with a hidden prefix
    Hidden,
    /// No read permission
    Unreadable,
    /// Subdirectory, socket, device...
    NotAFile,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Hidden => write!(f, "Skipping hidden entry"),
            SkipReason::Unreadable => write!(f, "Skipping inaccessible entry"),
            SkipReason::NotAFile => write!(f, "Skipping non-regular file"),
        }
    }
}

/// One immediate child of the scanned directory
#[derive(Debug, Clone)]
pub struct ScannedEntry {
    /// Bare file name, relative to the scanned directory
    pub name: PathBuf,
    /// `dir.join(name)`
    pub path: PathBuf,
}

/// Files sharing one fingerprint, in scan order
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub fingerprint: Fingerprint,
    /// File names relative to the scanned directory; the first is canonical
    pub files: Vec<PathBuf>,
    /// Size of each member (equal content, equal size)
    pub size_bytes: u64,
}

impl DuplicateGroup {
    pub fn is_duplicate(&self) -> bool {
        self.files.len() > 1
    }

    /// The member that is kept
    pub fn canonical(&self) -> &Path {
        &self.files[0]
    }

    /// Every member after the first
    pub fn redundant(&self) -> &[PathBuf] {
        &self.files[1..]
    }

    /// Bytes held by the redundant copies
    pub fn wasted_bytes(&self) -> u64 {
        self.size_bytes * self.redundant().len() as u64
    }
}

/// Counters collected while scanning
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub entries_seen: usize,
    pub hashed: usize,
    pub skipped_hidden: usize,
    pub skipped_unreadable: usize,
    pub skipped_not_file: usize,
    pub hash_failures: usize,
    pub bytes_hashed: u64,
}

impl ScanStats {
    pub fn skipped(&self) -> usize {
        self.skipped_hidden + self.skipped_unreadable + self.skipped_not_file
    }

    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Hidden => self.skipped_hidden += 1,
            SkipReason::Unreadable => self.skipped_unreadable += 1,
            SkipReason::NotAFile => self.skipped_not_file += 1,
        }
    }
}

/// Fingerprint -> files, iterated in the order fingerprints were first seen.
///
/// Every key has at least one file and no file is under two keys. Groups of
/// one are kept: they are the unique files.
#[derive(Debug, Clone, Default)]
pub struct FingerprintIndex {
    groups: Vec<DuplicateGroup>,
    positions: HashMap<Fingerprint, usize>,
    stats: ScanStats,
}

impl FingerprintIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name` to the group for `fingerprint`, creating it if needed
    pub fn insert(&mut self, fingerprint: Fingerprint, name: PathBuf, size_bytes: u64) {
        match self.positions.get(&fingerprint) {
            Some(&idx) => self.groups[idx].files.push(name),
            None => {
                self.positions.insert(fingerprint.clone(), self.groups.len());
                self.groups.push(DuplicateGroup {
                    fingerprint,
                    files: vec![name],
                    size_bytes,
                });
            }
        }
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&DuplicateGroup> {
        self.positions.get(fingerprint).map(|&idx| &self.groups[idx])
    }

    /// Number of distinct fingerprints
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.groups.iter()
    }

    pub fn duplicate_groups(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.groups.iter().filter(|g| g.is_duplicate())
    }

    /// Total files grouped
    pub fn file_count(&self) -> usize {
        self.groups.iter().map(|g| g.files.len()).sum()
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn into_parts(self) -> (Vec<DuplicateGroup>, ScanStats) {
        (self.groups, self.stats)
    }
}

/// Scan the immediate entries of `dir` and group them by content.
///
/// Never fails: if the directory cannot be listed the problem is reported
/// and the index comes back empty.
pub fn scan(dir: &Path, options: &ScanOptions, reporter: &Reporter) -> FingerprintIndex {
    let mut index = FingerprintIndex::new();

    let entries = match list_entries(dir, options, reporter) {
        Some(entries) => entries,
        None => return index,
    };

    for entry in entries {
        index.stats.entries_seen += 1;

        let size_bytes = match classify(&entry, options) {
            Ok(size) => size,
            Err(reason) => {
                reporter.skipped(&entry.path, reason);
                index.stats.record_skip(reason);
                continue;
            }
        };

        match hasher::fingerprint(dir, &entry.name) {
            Ok(fp) => {
                index.stats.hashed += 1;
                index.stats.bytes_hashed += size_bytes;
                index.insert(fp, entry.name, size_bytes);
            }
            Err(e) => {
                reporter.failed(&e);
                index.stats.hash_failures += 1;
            }
        }
    }

    tracing::debug!(
        "Scanned {}: {} entries, {} fingerprints",
        dir.display(),
        index.stats.entries_seen,
        index.len()
    );
    index
}

/// List `dir` one level deep. Unreadable individual entries are reported and dropped.
fn list_entries(dir: &Path, options: &ScanOptions, reporter: &Reporter) -> Option<Vec<ScannedEntry>> {
    let read_dir = match std::fs::read_dir(dir).at_path(dir) {
        Ok(rd) => rd,
        Err(e) => {
            reporter.failed(&e);
            return None;
        }
    };

    let mut entries = Vec::new();
    for entry in read_dir {
        match entry.at_path(dir) {
            Ok(entry) => {
                let name = PathBuf::from(entry.file_name());
                entries.push(ScannedEntry {
                    path: dir.join(&name),
                    name,
                });
            }
            Err(e) => reporter.failed(&e),
        }
    }

    if options.sort_entries {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Some(entries)
}

/// Apply the skip rules in order: hidden, not a regular file, unreadable.
/// Returns the file size for entries that should be hashed.
///
/// The file type is settled from metadata before anything is opened: opening
/// a FIFO for reading blocks until a writer shows up.
fn classify(entry: &ScannedEntry, options: &ScanOptions) -> Result<u64, SkipReason> {
    if options.is_hidden(&entry.name.to_string_lossy()) {
        return Err(SkipReason::Hidden);
    }
    let size = match std::fs::metadata(&entry.path) {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => return Err(SkipReason::NotAFile),
        Err(_) => return Err(SkipReason::Unreadable),
    };
    if !permissions::can_read(&entry.path) {
        return Err(SkipReason::Unreadable);
    }
    Ok(size)
}
