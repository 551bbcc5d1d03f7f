//! Backup CLI commands
//!
//! Implements the admin commands for snapshot management.

use clap::Subcommand;

use crate::backup::{BackupSystem, SnapshotId, RESTORE_CONFIRMATION};
use crate::config::paths::LiftlogPaths;
use crate::config::settings::Settings;
use crate::error::{LiftlogResult, RestoreError};

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new verified snapshot of the workout store
    Create,

    /// List all snapshots, newest first
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show aggregate snapshot statistics
    Stats,

    /// Evict the oldest snapshots beyond the retention bound
    Cleanup,

    /// Re-verify a snapshot's checksum
    Verify {
        /// Snapshot identifier
        id: String,
    },

    /// Replace the live store with a snapshot (destructive)
    Restore {
        /// Snapshot identifier
        id: String,

        /// Type the literal word `confirm` to proceed
        confirmation: Option<String>,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    paths: &LiftlogPaths,
    settings: &Settings,
    cmd: BackupCommands,
) -> LiftlogResult<()> {
    let system = BackupSystem::open(paths)?;

    match cmd {
        BackupCommands::Create => {
            println!("Creating snapshot...");
            let snap = system.engine.create()?;
            println!("Snapshot created: {}", snap.id);
            println!("Size: {}", format_size(snap.size_bytes));
            println!("Verified: yes");
        }

        BackupCommands::List { verbose } => {
            let snapshots = system.retention.list()?;

            if snapshots.is_empty() {
                println!("No snapshots found.");
                println!("Create one with: liftlog backup create");
                return Ok(());
            }

            println!("Available Snapshots");
            println!("===================");
            println!();

            for (i, snap) in snapshots.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(snap.created_at);
                let verified_marker = if snap.verified { "" } else { " [UNVERIFIED]" };

                if verbose {
                    println!(
                        "{}. {}{}\n   Created: {}\n   Size: {}\n   Age: {}\n   Checksum: {}\n",
                        i + 1,
                        snap.id,
                        verified_marker,
                        snap.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(snap.size_bytes),
                        format_duration(age),
                        snap.checksum,
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {}){}",
                        i + 1,
                        snap.id,
                        format_duration(age),
                        format_size(snap.size_bytes),
                        verified_marker,
                    );
                }
            }

            println!();
            println!("Total: {} snapshot(s)", snapshots.len());
        }

        BackupCommands::Stats => {
            let stats = system.retention.stats()?;

            println!("Snapshot Statistics");
            println!("===================");

            if stats.count == 0 {
                println!("No snapshots found.");
            } else {
                println!("Count:      {}", stats.count);
                println!("Total size: {}", format_size(stats.total_bytes));
                println!("Verified:   {}/{}", stats.verified_count, stats.count);
                if let Some(newest) = &stats.newest {
                    println!("Newest:     {}", newest);
                }
                if let Some(oldest) = &stats.oldest {
                    println!("Oldest:     {}", oldest);
                }
            }

            println!();
            println!("Policy:");
            println!("  Max snapshots: {}", settings.backup.max_snapshots);
            println!(
                "  Schedule interval: every {} hours",
                settings.backup.schedule_interval_hours
            );
            println!("  Directory: {}", paths.snapshots_dir().display());
        }

        BackupCommands::Cleanup => {
            let evicted = system.retention.cleanup(settings.backup.max_snapshots)?;
            let remaining = system.retention.list()?.len();

            println!("Cleanup complete.");
            println!("Evicted: {} snapshot(s)", evicted);
            println!("Remaining: {} snapshot(s)", remaining);
        }

        BackupCommands::Verify { id } => {
            let id = SnapshotId::from(id);
            if system.engine.verify(&id)? {
                println!("Snapshot {} verified: checksum matches.", id);
            } else {
                println!("Snapshot {} FAILED verification.", id);
                println!("Do not restore from this snapshot.");
            }
        }

        BackupCommands::Restore { id, confirmation } => {
            let id = SnapshotId::from(id);
            let token = confirmation.unwrap_or_default();

            match system.restore.restore(&id, &token) {
                Ok(outcome) => {
                    println!("Restore complete.");
                    println!("Live store restored from: {}", outcome.restored.id);
                    println!(
                        "Pre-restore state saved as: {}",
                        outcome.safety_snapshot.id
                    );
                    println!();
                    println!("To undo this restore, run:");
                    println!(
                        "  liftlog backup restore {} {}",
                        outcome.safety_snapshot.id, RESTORE_CONFIRMATION
                    );
                }
                Err(RestoreError::NotConfirmed) => {
                    println!("DANGER: this will REPLACE the live workout store!");
                    println!("A snapshot of the current state is taken first, but the");
                    println!("current data will no longer be live.");
                    println!();
                    println!("To proceed, run again with the confirmation word:");
                    println!("  liftlog backup restore {} {}", id, RESTORE_CONFIRMATION);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    let months = days / 30;
    format!("{}mo", months)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
