//! Backup and recovery for the workout store
//!
//! This is the core of liftlog: verified point-in-time snapshots of the live
//! store, a retention bound, an unattended schedule, and an atomic restore
//! path with a built-in undo.
//!
//! # Architecture
//!
//! Four components share one store handle and one maintenance lock:
//!
//! - `SnapshotEngine`: write-then-verify snapshot creation
//! - `RetentionManager`: listing, statistics, and maximum-count eviction
//! - `Scheduler`: background worker firing snapshot + cleanup on an interval
//! - `RestoreOrchestrator`: confirmation-gated atomic replacement of the
//!   live store, preceded by a safety snapshot
//!
//! The maintenance lock serializes every snapshot-directory mutation
//! (manual snapshot, scheduled snapshot, cleanup, restore), so cleanup can
//! never evict a snapshot mid-restore and two writers can never race to the
//! same identifier.
//!
//! # On-disk layout
//!
//! One pair of files per snapshot in the snapshot directory:
//! `liftlog-<id>.snap` holds the verbatim store copy, `liftlog-<id>.json`
//! the manifest (id, timestamp, size, SHA-256 digest, verified flag). The
//! manifest is written last, so a snapshot only becomes discoverable once
//! verified.

pub mod engine;
pub mod restore;
pub mod retention;
pub mod scheduler;
pub mod snapshot;

pub use engine::SnapshotEngine;
pub use restore::{RestoreOrchestrator, RestoreOutcome, RESTORE_CONFIRMATION};
pub use retention::{BackupStats, RetentionManager};
pub use scheduler::{ScheduleStatus, Scheduler, StartOutcome, StopOutcome};
pub use snapshot::{Snapshot, SnapshotId};

use std::sync::{Arc, Mutex};

use crate::config::paths::LiftlogPaths;
use crate::error::LiftlogResult;
use crate::storage::LiveStore;

/// The assembled backup system for one data directory
///
/// Wires the engine, retention manager, and restore orchestrator to a single
/// store handle and maintenance lock. The scheduler is constructed separately
/// by hosts that want automated snapshots.
pub struct BackupSystem {
    pub store: Arc<LiveStore>,
    pub engine: Arc<SnapshotEngine>,
    pub retention: Arc<RetentionManager>,
    pub restore: RestoreOrchestrator,
}

impl BackupSystem {
    /// Open the backup system rooted at the given paths
    pub fn open(paths: &LiftlogPaths) -> LiftlogResult<Self> {
        paths.ensure_directories()?;

        let store = Arc::new(LiveStore::open(paths.store_file()));
        let maintenance = Arc::new(Mutex::new(()));
        let snapshots_dir = paths.snapshots_dir();

        let engine = Arc::new(SnapshotEngine::new(
            Arc::clone(&store),
            snapshots_dir.clone(),
            Arc::clone(&maintenance),
        ));
        let retention = Arc::new(RetentionManager::new(
            snapshots_dir.clone(),
            Arc::clone(&maintenance),
        ));
        let restore = RestoreOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&engine),
            Arc::clone(&retention),
            snapshots_dir,
            maintenance,
        );

        Ok(Self {
            store,
            engine,
            retention,
            restore,
        })
    }

    /// Build a scheduler over this system's engine and retention manager
    pub fn scheduler(&self, max_snapshots: u32) -> Scheduler {
        Scheduler::new(
            Arc::clone(&self.engine),
            Arc::clone(&self.retention),
            max_snapshots,
        )
    }
}
