use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "dupsweep.toml";

/// dupsweep configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Where redundant files are moved when not deleting.
    /// Relative paths resolve against the working directory, not the scanned folder.
    #[serde(default = "default_quarantine_dir")]
    pub quarantine_dir: PathBuf,

    /// Append-only history log
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Entry names starting with any of these are treated as hidden
    #[serde(default = "default_hidden_prefixes")]
    pub hidden_prefixes: Vec<String>,

    /// Sort entries by name before grouping so the canonical file is stable
    #[serde(default = "default_sort_entries")]
    pub sort_entries: bool,
}

fn default_quarantine_dir() -> PathBuf {
    PathBuf::from("duplicates")
}
fn default_log_file() -> PathBuf {
    PathBuf::from("history.log")
}
fn default_hidden_prefixes() -> Vec<String> {
    vec![".".to_string(), "_".to_string()]
}
fn default_sort_entries() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quarantine_dir: default_quarantine_dir(),
            log_file: default_log_file(),
            hidden_prefixes: default_hidden_prefixes(),
            sort_entries: default_sort_entries(),
        }
    }
}

impl Config {
    /// Default config file path (`./dupsweep.toml`)
    pub fn config_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE_NAME)
    }

    /// Load from `./dupsweep.toml` if present, otherwise defaults
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from an explicit path; a missing file is an error here
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the given path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}
