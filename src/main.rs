use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use dupsweep::cli::output;
use dupsweep::cli::{Cli, OutputFormat};
use dupsweep::common::config::Config;
use dupsweep::duplicates::{self, Disposition, ResolveOptions, RunOptions, ScanOptions};
use dupsweep::logging::{self, Reporter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let config = cli.apply_overrides(config);

    if cli.write_config {
        let path = Config::config_path();
        config.save(&path)?;
        println!("  {} Wrote {}", "✓".green(), path.display());
        return Ok(());
    }

    let _log = logging::init(&config.log_file, cli.verbose)?;
    let reporter = Reporter::new(cli.echo());

    // Nothing is touched unless the target is a readable folder
    if let Err(e) = duplicates::check_target(&cli.folder) {
        logging::record_failure(&e);
        output::print_target_error(&e);
        return Ok(());
    }

    let disposition = if cli.remove {
        Disposition::Delete
    } else {
        Disposition::Quarantine(config.quarantine_dir.clone())
    };
    let options = RunOptions {
        scan: ScanOptions::from(&config),
        resolve: ResolveOptions {
            disposition,
            audit: cli.log,
            dry_run: cli.dry_run,
        },
    };

    if reporter.echoes() {
        output::print_run_header(&cli.folder, &options.resolve.disposition, cli.dry_run);
    }

    let summary = match duplicates::run(&cli.folder, &options, &reporter) {
        Ok(summary) => summary,
        Err(e) => {
            output::print_target_error(&e);
            return Ok(());
        }
    };

    match cli.format {
        OutputFormat::Human => output::print_summary(&summary),
        OutputFormat::Json => output::print_summary_json(&summary),
        OutputFormat::Quiet => output::print_summary_quiet(&summary),
    }

    Ok(())
}
