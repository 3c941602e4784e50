use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// The three ways a filesystem step can fail.
///
/// Every per-directory, per-entry and per-file operation reduces its
/// `io::Error` to one of these so callers can report it uniformly and
/// move on to the next unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    PermissionDenied,
    NotFound,
    Unexpected,
}

impl FailureKind {
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
            io::ErrorKind::NotFound => FailureKind::NotFound,
            _ => FailureKind::Unexpected,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::PermissionDenied => write!(f, "Permission denied"),
            FailureKind::NotFound => write!(f, "Not found"),
            FailureKind::Unexpected => write!(f, "Unexpected error"),
        }
    }
}

/// A filesystem failure tied to the path that caused it.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("Permission denied: '{}'", path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Not found: '{}'", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unexpected error at '{}': {}", path.display(), source)]
    Unexpected {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Classify an I/O error against the path it happened on.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match FailureKind::from_io(&source) {
            FailureKind::PermissionDenied => FsError::PermissionDenied { path, source },
            FailureKind::NotFound => FsError::NotFound { path, source },
            FailureKind::Unexpected => FsError::Unexpected { path, source },
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            FsError::PermissionDenied { .. } => FailureKind::PermissionDenied,
            FsError::NotFound { .. } => FailureKind::NotFound,
            FsError::Unexpected { .. } => FailureKind::Unexpected,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FsError::PermissionDenied { path, .. }
            | FsError::NotFound { path, .. }
            | FsError::Unexpected { path, .. } => path,
        }
    }

    pub fn io_error(&self) -> &io::Error {
        match self {
            FsError::PermissionDenied { source, .. }
            | FsError::NotFound { source, .. }
            | FsError::Unexpected { source, .. } => source,
        }
    }
}

/// Shorthand for wrapping a fallible `io` call with its path.
pub trait IoResultExt<T> {
    fn at_path(self, path: &Path) -> Result<T, FsError>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at_path(self, path: &Path) -> Result<T, FsError> {
        self.map_err(|e| FsError::from_io(path, e))
    }
}
