use anyhow::Result;
use clap::{Parser, Subcommand};

use liftlog::cli::{
    handle_backup_command, handle_schedule_command, BackupCommands, ScheduleCommands,
};
use liftlog::config::{paths::LiftlogPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "liftlog",
    version,
    about = "Workout-tracking assistant data store with verified snapshots",
    long_about = "liftlog keeps a personal workout log safe: it creates verified \
                  point-in-time snapshots of the workout store, enforces a \
                  retention bound, runs an unattended snapshot schedule, and can \
                  atomically restore a prior snapshot with a built-in undo path."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Automated snapshot schedule
    #[command(subcommand)]
    Schedule(ScheduleCommands),

    /// Initialize the data directory and live store
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let paths = LiftlogPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&paths, &settings, cmd)?;
        }
        Some(Commands::Schedule(cmd)) => {
            handle_schedule_command(&paths, &settings, cmd)?;
        }
        Some(Commands::Init) => {
            println!("Initializing liftlog at: {}", paths.base_dir().display());
            liftlog::storage::initialize_storage(&paths)?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Live store: {}", paths.store_file().display());
            println!("Snapshots:  {}", paths.snapshots_dir().display());
        }
        Some(Commands::Config) => {
            println!("liftlog Configuration");
            println!("=====================");
            println!("Base directory:     {}", paths.base_dir().display());
            println!("Live store:         {}", paths.store_file().display());
            println!("Snapshot directory: {}", paths.snapshots_dir().display());
            println!();
            println!("Settings:");
            println!("  Max snapshots: {}", settings.backup.max_snapshots);
            println!(
                "  Schedule interval: every {} hours",
                settings.backup.schedule_interval_hours
            );
        }
        None => {
            println!("liftlog - workout tracking with verified snapshots");
            println!();
            println!("Run 'liftlog --help' for usage information.");
            println!("Run 'liftlog init' to set up the data directory.");
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("liftlog=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
