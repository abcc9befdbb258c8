//! Backup Archiver - Main entry point
//!
//! Moves the backup a firewall pushed into the incoming directory to
//! `<archive_path>/<hostname>/<hostname>_<timestamp>.conf`.

use backup_archiver::settings::{Overrides, Settings};
use backup_archiver::{utils, ArchiveError, Archiver};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file [default: config.json]
    #[arg(short, long, value_name = "FILE", alias = "config_file")]
    config: Option<PathBuf>,

    /// Search here for the backup file
    #[arg(short, long, alias = "incoming_path")]
    incoming_path: Option<String>,

    /// Archive tree root
    #[arg(short, long, alias = "archive_path")]
    archive_path: Option<String>,

    /// Name of the backup file
    #[arg(short = 'n', long, alias = "backup_name")]
    backup_name: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Show what is being done
    #[arg(short, long)]
    verbose: bool,

    /// Work out the destination without moving anything
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config.clone(),
            incoming_path: self.incoming_path.clone(),
            archive_path: self.archive_path.clone(),
            backup_name: self.backup_name.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match Settings::load(&args.overrides()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("FATAL: {e}");
            return ExitCode::from(e.exit_code());
        }
    };

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { settings.log.level.as_str() };
    if let Err(e) = utils::logger::init(log_level, settings.log.remote.as_ref()) {
        eprintln!("FATAL: could not initialize logging: {e:#}");
        return ExitCode::from(ArchiveError::Config(e.to_string()).exit_code());
    }
    tracing::info!("Logging initialized.");

    match run(&settings, args.dry_run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}, aborting", e);
            eprintln!("{e}, aborting");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(settings: &Settings, dry_run: bool) -> backup_archiver::Result<()> {
    let archiver = Archiver::new(&settings.archive);

    if dry_run {
        let plan = archiver.plan()?;
        tracing::info!(
            "Dry run: {} would be moved to {}",
            plan.source.display(),
            plan.destination.full_path().display()
        );
        return Ok(());
    }

    let archived = archiver.archive()?;
    println!("Archived {} to {}", archived.identifier, archived.destination.display());
    Ok(())
}
