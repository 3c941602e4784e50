use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::common::config::Config;

/// Keep one copy of every file in a folder
#[derive(Parser, Debug)]
#[command(
    name = "dupsweep",
    version,
    about = "Find byte-identical files in a folder and delete or quarantine the extras",
    long_about = "dupsweep fingerprints every file directly inside FOLDER, keeps the first\n\
                  file of each identical group (by name) and moves the others into a\n\
                  'duplicates' folder in the current directory, or deletes them with --remove.",
    after_help = "EXAMPLES:\n  \
        dupsweep                          Quarantine duplicates in the current folder\n  \
        dupsweep ~/Downloads --dry-run    Preview what would happen\n  \
        dupsweep ~/Downloads -R -L        Delete duplicates and log each deletion\n  \
        dupsweep . --format json          Machine-readable summary"
)]
pub struct Cli {
    /// Folder to scan (not recursive)
    #[arg(default_value = "./")]
    pub folder: PathBuf,

    /// Remove files instead of moving them
    #[arg(short = 'R', long)]
    pub remove: bool,

    /// Save logs for actions performed
    #[arg(short = 'L', long)]
    pub log: bool,

    /// Show what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Quarantine folder (default: ./duplicates)
    #[arg(long, value_name = "DIR", env = "DUPSWEEP_QUARANTINE_DIR")]
    pub quarantine_dir: Option<PathBuf>,

    /// History log file (default: ./history.log)
    #[arg(long, value_name = "PATH", env = "DUPSWEEP_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Config file (default: ./dupsweep.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the effective configuration to ./dupsweep.toml and exit
    #[arg(long)]
    pub write_config: bool,

    /// Output format
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Verbose output on stderr
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Command-line values win over the config file
    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.quarantine_dir {
            config.quarantine_dir = dir.clone();
        }
        if let Some(file) = &self.log_file {
            config.log_file = file.clone();
        }
        config
    }

    /// Console mirroring only makes sense for human output
    pub fn echo(&self) -> bool {
        matches!(self.format, OutputFormat::Human)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Quiet,
}
