//! Schedule CLI commands
//!
//! Runs the automated snapshot schedule in the foreground. In a resident
//! host process the scheduler is started and stopped by admin commands; the
//! CLI stand-in keeps the schedule alive for the life of the `run`
//! invocation instead.

use clap::Subcommand;

use crate::backup::{BackupSystem, StartOutcome};
use crate::config::paths::LiftlogPaths;
use crate::config::settings::Settings;
use crate::error::LiftlogResult;

/// Schedule subcommands
#[derive(Subcommand)]
pub enum ScheduleCommands {
    /// Run the automated snapshot schedule in the foreground
    Run {
        /// Hours between snapshots (defaults to the configured interval)
        #[arg(long)]
        interval_hours: Option<u64>,
    },
}

/// Handle a schedule command
pub fn handle_schedule_command(
    paths: &LiftlogPaths,
    settings: &Settings,
    cmd: ScheduleCommands,
) -> LiftlogResult<()> {
    match cmd {
        ScheduleCommands::Run { interval_hours } => {
            let hours = interval_hours.unwrap_or(settings.backup.schedule_interval_hours);

            let system = BackupSystem::open(paths)?;
            let scheduler = system.scheduler(settings.backup.max_snapshots);

            if let StartOutcome::AlreadyRunning = scheduler.start(hours) {
                println!("Snapshot schedule is already running.");
                return Ok(());
            }

            println!("Automated snapshots started.");
            println!("  Interval: every {} hours", hours);
            println!("  Retention: {} snapshots", settings.backup.max_snapshots);
            println!("  Directory: {}", paths.snapshots_dir().display());
            println!();
            println!("Press Ctrl-C to stop.");

            // The schedule lives for the life of this process
            loop {
                std::thread::park();
            }
        }
    }
}
