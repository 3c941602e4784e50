use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::common::errors::{FsError, IoResultExt};
use crate::common::format::short_hash;

/// Read buffer for hashing (1MB)
const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Hex chars used when a fingerprint is shown or embedded in a file name
pub const SHORT_LEN: usize = 8;

/// SHA-256 of a file's full content, as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn short(&self) -> &str {
        short_hash(&self.0, SHORT_LEN)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint `name` inside `dir`
pub fn fingerprint(dir: &Path, name: &Path) -> Result<Fingerprint, FsError> {
    fingerprint_path(&dir.join(name))
}

/// Hash the whole file. No sampling: two files only match if every byte does.
pub fn fingerprint_path(path: &Path) -> Result<Fingerprint, FsError> {
    let file = File::open(path).at_path(path)?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut hasher = Sha256::new();

    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer).at_path(path)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Fingerprint(format!("{:x}", hasher.finalize())))
}

/// Fingerprint of an in-memory buffer; matches [`fingerprint_path`] for the same bytes
pub fn fingerprint_bytes(bytes: &[u8]) -> Fingerprint {
    Fingerprint(format!("{:x}", Sha256::digest(bytes)))
}
