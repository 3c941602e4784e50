use std::path::Path;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable byte count ("0 B", "1.5 KB", "2.00 MB")
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    match unit {
        0 => format!("{} B", bytes),
        1 => format!("{:.1} {}", value, UNITS[unit]),
        _ => format!("{:.2} {}", value, UNITS[unit]),
    }
}

/// "1 file" / "N files"
pub fn format_count(count: usize) -> String {
    if count == 1 {
        "1 file".to_string()
    } else {
        format!("{} files", count)
    }
}

/// Display a path with the home directory shortened to ~
pub fn format_path(path: &Path) -> String {
    match dirs::home_dir() {
        Some(home) => match path.strip_prefix(&home) {
            Ok(rest) => format!("~/{}", rest.display()),
            Err(_) => path.display().to_string(),
        },
        None => path.display().to_string(),
    }
}

/// Elapsed time as "250ms", "3.4s" or "2m 5s"
pub fn format_duration(secs: f64) -> String {
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        format!("{}m {:.0}s", mins as u64, secs - mins * 60.0)
    }
}

/// Leading characters of a fingerprint, for compact display
pub fn short_hash(hash: &str, len: usize) -> &str {
    match hash.char_indices().nth(len) {
        Some((idx, _)) => &hash[..idx],
        None => hash,
    }
}
