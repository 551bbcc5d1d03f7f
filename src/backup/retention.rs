//! Snapshot retention
//!
//! Lists the snapshot set, computes aggregate statistics, and enforces the
//! maximum-count policy by evicting the oldest excess snapshots.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backup::snapshot::{self, Snapshot, SnapshotId};
use crate::error::SnapshotError;

/// Aggregate statistics over the snapshot set
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackupStats {
    pub count: usize,
    pub total_bytes: u64,
    pub oldest: Option<SnapshotId>,
    pub newest: Option<SnapshotId>,
    pub verified_count: usize,
}

/// Enumerates snapshots and enforces the retention bound
pub struct RetentionManager {
    snapshots_dir: PathBuf,
    maintenance: Arc<Mutex<()>>,
}

impl RetentionManager {
    pub fn new(snapshots_dir: PathBuf, maintenance: Arc<Mutex<()>>) -> Self {
        Self {
            snapshots_dir,
            maintenance,
        }
    }

    /// List all snapshots, newest first
    ///
    /// Only snapshots with a readable manifest are returned; an unreadable
    /// manifest is logged and skipped so one damaged file cannot hide the
    /// rest of the set.
    pub fn list(&self) -> Result<Vec<Snapshot>, SnapshotError> {
        if !self.snapshots_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.snapshots_dir).map_err(|e| SnapshotError::Io {
            path: self.snapshots_dir.clone(),
            source: e,
        })?;

        let mut snapshots = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SnapshotError::Io {
                path: self.snapshots_dir.clone(),
                source: e,
            })?;
            let path = entry.path();

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with("liftlog-") || !name.ends_with(".json") {
                continue;
            }

            match snapshot::read_manifest(&path) {
                Ok(snap) => snapshots.push(snap),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable manifest"),
            }
        }

        snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(snapshots)
    }

    /// Look up a single snapshot by identifier
    pub fn find(&self, id: &SnapshotId) -> Result<Option<Snapshot>, SnapshotError> {
        let manifest_path = snapshot::manifest_path(&self.snapshots_dir, id);
        if !manifest_path.exists() {
            return Ok(None);
        }
        snapshot::read_manifest(&manifest_path).map(Some)
    }

    /// Compute aggregate statistics over the snapshot set
    pub fn stats(&self) -> Result<BackupStats, SnapshotError> {
        let snapshots = self.list()?;

        Ok(BackupStats {
            count: snapshots.len(),
            total_bytes: snapshots.iter().map(|s| s.size_bytes).sum(),
            oldest: snapshots.last().map(|s| s.id.clone()),
            newest: snapshots.first().map(|s| s.id.clone()),
            verified_count: snapshots.iter().filter(|s| s.verified).count(),
        })
    }

    /// Evict the oldest snapshots beyond `max_snapshots`
    ///
    /// Deletion is best-effort per snapshot: a failed delete is logged as a
    /// warning and does not abort the pass. Returns the number of snapshots
    /// successfully evicted.
    pub fn cleanup(&self, max_snapshots: u32) -> Result<usize, SnapshotError> {
        let _guard = self
            .maintenance
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let snapshots = self.list()?;
        if snapshots.len() <= max_snapshots as usize {
            debug!(
                count = snapshots.len(),
                max_snapshots, "retention cleanup not needed"
            );
            return Ok(0);
        }

        let mut evicted = 0;
        for snap in snapshots.into_iter().skip(max_snapshots as usize) {
            // Manifest first: once it is gone the snapshot is no longer
            // discoverable even if the data unlink fails.
            let manifest_path = snapshot::manifest_path(&self.snapshots_dir, &snap.id);
            if let Err(e) = fs::remove_file(&manifest_path) {
                warn!(id = %snap.id, error = %e, "failed to evict snapshot");
                continue;
            }

            let data_path = snapshot::data_path(&self.snapshots_dir, &snap.id);
            if let Err(e) = fs::remove_file(&data_path) {
                warn!(id = %snap.id, error = %e, "evicted manifest but data file remains");
            }

            info!(id = %snap.id, "evicted snapshot");
            evicted += 1;
        }

        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::engine::SnapshotEngine;
    use crate::storage::LiveStore;
    use tempfile::TempDir;

    fn test_setup(content: &[u8]) -> (SnapshotEngine, RetentionManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store_path = temp_dir.path().join("workouts.db");
        fs::write(&store_path, content).unwrap();

        let snapshots_dir = temp_dir.path().join("snapshots");
        let maintenance = Arc::new(Mutex::new(()));

        let engine = SnapshotEngine::new(
            Arc::new(LiveStore::open(store_path)),
            snapshots_dir.clone(),
            Arc::clone(&maintenance),
        );
        let retention = RetentionManager::new(snapshots_dir, maintenance);
        (engine, retention, temp_dir)
    }

    #[test]
    fn test_list_empty_directory() {
        let (_engine, retention, _temp) = test_setup(b"x");
        assert!(retention.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_newest_first() {
        let (engine, retention, _temp) = test_setup(b"workout log");

        engine.create().unwrap();
        engine.create().unwrap();
        engine.create().unwrap();

        let snapshots = retention.list().unwrap();
        assert_eq!(snapshots.len(), 3);
        assert!(snapshots[0].created_at >= snapshots[1].created_at);
        assert!(snapshots[1].created_at >= snapshots[2].created_at);
    }

    #[test]
    fn test_find_existing_and_missing() {
        let (engine, retention, _temp) = test_setup(b"leg day");

        let snap = engine.create().unwrap();

        assert!(retention.find(&snap.id).unwrap().is_some());
        assert!(retention
            .find(&SnapshotId::from("19990101-000000-000"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_stats() {
        let (engine, retention, _temp) = test_setup(b"12345678");

        let first = engine.create().unwrap();
        let last = engine.create().unwrap();

        let stats = retention.stats().unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.total_bytes, 16);
        assert_eq!(stats.verified_count, 2);
        assert_eq!(stats.oldest, Some(first.id));
        assert_eq!(stats.newest, Some(last.id));
    }

    #[test]
    fn test_stats_empty() {
        let (_engine, retention, _temp) = test_setup(b"x");

        let stats = retention.stats().unwrap();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.total_bytes, 0);
        assert!(stats.oldest.is_none());
        assert!(stats.newest.is_none());
    }

    #[test]
    fn test_cleanup_under_bound_is_noop() {
        let (engine, retention, _temp) = test_setup(b"ohp");

        engine.create().unwrap();
        engine.create().unwrap();

        assert_eq!(retention.cleanup(5).unwrap(), 0);
        assert_eq!(retention.list().unwrap().len(), 2);
    }

    #[test]
    fn test_cleanup_keeps_newest_thirty_of_thirty_five() {
        let (engine, retention, _temp) = test_setup(b"set");

        let mut ids = Vec::new();
        for _ in 0..35 {
            ids.push(engine.create().unwrap().id);
        }

        let evicted = retention.cleanup(30).unwrap();
        assert_eq!(evicted, 5);

        let remaining = retention.list().unwrap();
        assert_eq!(remaining.len(), 30);

        // Exactly the 30 most recent survive
        ids.sort();
        let expected: Vec<_> = ids.into_iter().rev().take(30).collect();
        let actual: Vec<_> = remaining.into_iter().map(|s| s.id).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_cleanup_removes_files_from_disk() {
        let (engine, retention, _temp) = test_setup(b"amrap");

        let oldest = engine.create().unwrap();
        engine.create().unwrap();

        retention.cleanup(1).unwrap();

        assert!(!oldest.data_path(engine.snapshots_dir()).exists());
        assert!(retention.find(&oldest.id).unwrap().is_none());
    }
}
