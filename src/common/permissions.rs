use std::fs::File;
use std::path::Path;

/// Check if we can read a path.
///
/// Directories are probed by listing them, regular files by opening them.
/// A metadata call alone would succeed on files we cannot actually open.
/// Anything else (FIFOs, sockets, devices) is never opened and reports false.
pub fn can_read(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => std::fs::read_dir(path).is_ok(),
        Ok(meta) if meta.is_file() => File::open(path).is_ok(),
        _ => false,
    }
}

/// Get a helpful message for permission issues
pub fn permission_hint(path: &Path) -> String {
    format!(
        "Check permissions for '{}'. The current user needs read access to scan it.",
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_can_read_existing_file_and_dir() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(can_read(dir.path()));
        assert!(can_read(&file));
    }

    #[cfg(unix)]
    #[test]
    fn test_fifo_is_not_readable() {
        let dir = TempDir::new().unwrap();
        let fifo = dir.path().join("pipe");
        let made = std::process::Command::new("mkfifo").arg(&fifo).status();
        if !matches!(made, Ok(status) if status.success()) {
            return;
        }
        assert!(!can_read(&fifo));
    }

    #[test]
    fn test_cannot_read_missing_path() {
        assert!(!can_read(Path::new("/nonexistent/dupsweep/xyz")));
    }
}
