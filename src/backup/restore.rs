//! Restore orchestration
//!
//! Replacing the live store with a snapshot is the highest-consequence
//! operation in the system. The caller must supply a literal confirmation,
//! the target must re-verify, a safety snapshot of the current state is
//! captured first, and the actual replacement is a single atomic rename from
//! a staging file. Every failure path leaves the live store exactly as it
//! was.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::backup::engine::SnapshotEngine;
use crate::backup::retention::RetentionManager;
use crate::backup::snapshot::{self, Snapshot, SnapshotId};
use crate::error::RestoreError;
use crate::storage::LiveStore;

/// Literal token a caller must supply to authorize a restore
///
/// A friction point against accidental invocation, not a security control;
/// authorization is enforced upstream by the command layer.
pub const RESTORE_CONFIRMATION: &str = "confirm";

/// Result of a successful restore
#[derive(Debug, Clone)]
pub struct RestoreOutcome {
    /// The snapshot now live
    pub restored: Snapshot,
    /// Snapshot of the pre-restore state, the immediate undo path
    pub safety_snapshot: Snapshot,
    pub completed_at: DateTime<Utc>,
}

/// Validates, safety-backs-up, and atomically applies a restore
pub struct RestoreOrchestrator {
    store: Arc<LiveStore>,
    engine: Arc<SnapshotEngine>,
    retention: Arc<RetentionManager>,
    snapshots_dir: PathBuf,
    maintenance: Arc<Mutex<()>>,
}

impl RestoreOrchestrator {
    pub fn new(
        store: Arc<LiveStore>,
        engine: Arc<SnapshotEngine>,
        retention: Arc<RetentionManager>,
        snapshots_dir: PathBuf,
        maintenance: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            store,
            engine,
            retention,
            snapshots_dir,
            maintenance,
        }
    }

    /// Replace the live store with the identified snapshot
    ///
    /// On success, returns the safety snapshot captured immediately before
    /// the swap so the caller can offer an undo. Once started the restore
    /// runs to completion or to a defined failure state with the store
    /// unchanged; there is no cancellation path.
    pub fn restore(
        &self,
        id: &SnapshotId,
        confirmation: &str,
    ) -> Result<RestoreOutcome, RestoreError> {
        // Gate before any side effect
        if confirmation != RESTORE_CONFIRMATION {
            return Err(RestoreError::NotConfirmed);
        }

        let _guard = self
            .maintenance
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let target = match self.retention.find(id) {
            Ok(Some(snap)) => snap,
            Ok(None) => {
                return Err(RestoreError::SnapshotNotFound { id: id.to_string() });
            }
            Err(e) => {
                warn!(id = %id, error = %e, "snapshot unresolvable during restore");
                return Err(RestoreError::SnapshotNotFound { id: id.to_string() });
            }
        };

        // Re-verify on demand; the manifest's flag alone is not trusted for
        // a destructive operation.
        let verified = match self.engine.verify(id) {
            Ok(ok) => ok,
            Err(e) => {
                warn!(id = %id, error = %e, "verification failed during restore");
                false
            }
        };
        if !target.verified || !verified {
            return Err(RestoreError::SnapshotUnverified { id: id.to_string() });
        }

        info!(id = %id, "restore confirmed; capturing safety snapshot");

        // A restore never proceeds without a fresh rollback point
        let safety_snapshot = self
            .engine
            .create_unlocked()
            .map_err(RestoreError::SafetyBackupFailed)?;
        info!(id = %safety_snapshot.id, "pre-restore safety snapshot captured");

        let data_path = snapshot::data_path(&self.snapshots_dir, id);
        self.swap_live(&data_path).map_err(RestoreError::SwapFailed)?;

        info!(restored = %target.id, safety = %safety_snapshot.id, "live store restored");

        Ok(RestoreOutcome {
            restored: target,
            safety_snapshot,
            completed_at: Utc::now(),
        })
    }

    /// Stage the snapshot beside the live store, then rename over it
    ///
    /// Staging writes never touch the live path; the store's exclusive lock
    /// is held only for the rename itself.
    fn swap_live(&self, snapshot_data: &Path) -> io::Result<()> {
        let staging = staging_path(self.store.path());

        let result = (|| {
            let bytes = fs::read(snapshot_data)?;
            let mut file = File::create(&staging)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            self.store.swap_from(&staging)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&staging);
        }
        result
    }
}

/// Sibling staging path for the live store file
fn staging_path(store: &Path) -> PathBuf {
    let mut name = store
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "store".into());
    name.push(".staging");
    store.with_file_name(name)
}
