//! liftlog - Workout-tracking assistant with verified data store snapshots
//!
//! This library provides the backup and recovery core for the liftlog
//! workout tracker: point-in-time snapshots of the live store, integrity
//! verification, a retention bound, an unattended snapshot schedule, and an
//! atomic restore path with a built-in undo. The chat front end that drives
//! these operations lives outside this crate and talks to it through the
//! command layer.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `storage`: Live store handle and atomic file I/O
//! - `backup`: Snapshot engine, retention, scheduler, and restore
//! - `cli`: Admin command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use liftlog::backup::BackupSystem;
//! use liftlog::config::{paths::LiftlogPaths, settings::Settings};
//!
//! let paths = LiftlogPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//!
//! let system = BackupSystem::open(&paths)?;
//! let snapshot = system.engine.create()?;
//! system.retention.cleanup(settings.backup.max_snapshots)?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod storage;

pub use error::{LiftlogError, LiftlogResult, RestoreError, SnapshotError};
