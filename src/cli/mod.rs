//! CLI command handlers
//!
//! This module contains the implementation of the admin commands, bridging
//! the clap argument parsing with the backup system. Output is plain text;
//! upstream authorization is assumed to have already happened.

pub mod backup;
pub mod schedule;

pub use backup::{handle_backup_command, BackupCommands};
pub use schedule::{handle_schedule_command, ScheduleCommands};
