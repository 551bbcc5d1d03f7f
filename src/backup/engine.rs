//! Snapshot engine
//!
//! Produces verified, timestamped copies of the live workout store. A
//! snapshot is written to a temp file, renamed into place, re-read, and its
//! digest compared before the manifest is persisted; a failed snapshot leaves
//! nothing discoverable behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::backup::snapshot::{self, Snapshot, SnapshotId};
use crate::error::SnapshotError;
use crate::storage::{file_io, LiveStore};

/// Creates and verifies snapshots of the live store
pub struct SnapshotEngine {
    store: Arc<LiveStore>,
    snapshots_dir: PathBuf,
    maintenance: Arc<Mutex<()>>,
}

impl SnapshotEngine {
    /// Create a new engine
    ///
    /// `maintenance` is the store-level maintenance lock shared with the
    /// retention manager and restore orchestrator; it serializes every
    /// snapshot-directory mutation.
    pub fn new(
        store: Arc<LiveStore>,
        snapshots_dir: PathBuf,
        maintenance: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            store,
            snapshots_dir,
            maintenance,
        }
    }

    /// Create a verified snapshot of the current store state
    ///
    /// Either every step completes and the snapshot becomes discoverable, or
    /// the partial copy is deleted and an error is returned.
    pub fn create(&self) -> Result<Snapshot, SnapshotError> {
        let _guard = self
            .maintenance
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.create_unlocked()
    }

    /// Create a snapshot without taking the maintenance lock
    ///
    /// For callers that already hold the lock (the restore orchestrator's
    /// safety-backup step).
    pub(crate) fn create_unlocked(&self) -> Result<Snapshot, SnapshotError> {
        fs::create_dir_all(&self.snapshots_dir).map_err(|e| SnapshotError::Io {
            path: self.snapshots_dir.clone(),
            source: e,
        })?;

        // Consistent read of the live store
        let bytes = self
            .store
            .quiesced_read()
            .map_err(|e| SnapshotError::SourceUnavailable {
                path: self.store.path().to_path_buf(),
                source: e,
            })?;

        let (id, created_at) = self.reserve_id();
        let data_path = snapshot::data_path(&self.snapshots_dir, &id);
        let checksum = snapshot::digest_hex(&bytes);

        file_io::write_bytes_atomic(&data_path, &bytes)
            .map_err(|e| self.write_error(&data_path, e))?;

        // Re-read the copy and compare digests before trusting it
        let reread = match fs::read(&data_path) {
            Ok(reread) => reread,
            Err(e) => {
                let _ = fs::remove_file(&data_path);
                return Err(SnapshotError::Io {
                    path: data_path,
                    source: e,
                });
            }
        };

        if snapshot::digest_hex(&reread) != checksum {
            let _ = fs::remove_file(&data_path);
            warn!(id = %id, "snapshot copy did not read back to the same digest");
            return Err(SnapshotError::Corrupt { id: id.to_string() });
        }

        let snap = Snapshot {
            id,
            created_at,
            size_bytes: reread.len() as u64,
            checksum,
            verified: true,
        };

        if let Err(e) = snapshot::write_manifest(&self.snapshots_dir, &snap) {
            let _ = fs::remove_file(&data_path);
            return Err(e);
        }

        info!(id = %snap.id, size_bytes = snap.size_bytes, "snapshot created and verified");
        Ok(snap)
    }

    /// Recompute a snapshot's digest and compare it to the manifest
    ///
    /// Returns `false` when the copy is unreadable or its digest no longer
    /// matches. Errors are reserved for an unresolvable manifest.
    pub fn verify(&self, id: &SnapshotId) -> Result<bool, SnapshotError> {
        let manifest_path = snapshot::manifest_path(&self.snapshots_dir, id);
        let manifest = snapshot::read_manifest(&manifest_path)?;

        let data_path = snapshot::data_path(&self.snapshots_dir, id);
        let bytes = match fs::read(&data_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(id = %id, error = %e, "snapshot data unreadable during verification");
                return Ok(false);
            }
        };

        Ok(snapshot::digest_hex(&bytes) == manifest.checksum)
    }

    /// Snapshot directory this engine writes into
    pub fn snapshots_dir(&self) -> &Path {
        &self.snapshots_dir
    }

    /// Derive a fresh identifier from the clock
    ///
    /// Identifiers have millisecond resolution; if a snapshot with the same
    /// identifier already exists, wait out the clock rather than overwrite.
    fn reserve_id(&self) -> (SnapshotId, DateTime<Utc>) {
        loop {
            let now = Utc::now();
            let id = SnapshotId::from_timestamp(now);
            let taken = snapshot::data_path(&self.snapshots_dir, &id).exists()
                || snapshot::manifest_path(&self.snapshots_dir, &id).exists();
            if !taken {
                return (id, now);
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn write_error(&self, path: &Path, source: io::Error) -> SnapshotError {
        if source.kind() == io::ErrorKind::StorageFull {
            SnapshotError::NoSpace {
                dir: self.snapshots_dir.clone(),
                source,
            }
        } else {
            SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_engine(content: &[u8]) -> (SnapshotEngine, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store_path = temp_dir.path().join("workouts.db");
        fs::write(&store_path, content).unwrap();

        let engine = SnapshotEngine::new(
            Arc::new(LiveStore::open(store_path)),
            temp_dir.path().join("snapshots"),
            Arc::new(Mutex::new(())),
        );
        (engine, temp_dir)
    }

    #[test]
    fn test_create_produces_verified_snapshot() {
        let (engine, _temp) = test_engine(b"bench press 3x5 @ 80kg");

        let snap = engine.create().unwrap();

        assert!(snap.verified);
        assert_eq!(snap.size_bytes, 22);
        assert!(snap.data_path(engine.snapshots_dir()).exists());
        assert_eq!(
            fs::read(snap.data_path(engine.snapshots_dir())).unwrap(),
            b"bench press 3x5 @ 80kg"
        );
    }

    #[test]
    fn test_verify_fresh_snapshot() {
        let (engine, _temp) = test_engine(b"squat day");

        let snap = engine.create().unwrap();

        assert!(engine.verify(&snap.id).unwrap());
    }

    #[test]
    fn test_verify_detects_corruption() {
        let (engine, _temp) = test_engine(b"deadlift 5x3");

        let snap = engine.create().unwrap();

        // Flip a byte in the stored copy
        let data_path = snap.data_path(engine.snapshots_dir());
        let mut bytes = fs::read(&data_path).unwrap();
        bytes[0] ^= 0xFF;
        fs::write(&data_path, bytes).unwrap();

        assert!(!engine.verify(&snap.id).unwrap());
    }

    #[test]
    fn test_verify_unknown_id_is_error() {
        let (engine, _temp) = test_engine(b"rows");

        let result = engine.verify(&SnapshotId::from("19990101-000000-000"));

        assert!(matches!(result, Err(SnapshotError::Io { .. })));
    }

    #[test]
    fn test_missing_store_is_source_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let engine = SnapshotEngine::new(
            Arc::new(LiveStore::open(temp_dir.path().join("missing.db"))),
            temp_dir.path().join("snapshots"),
            Arc::new(Mutex::new(())),
        );

        let result = engine.create();

        assert!(matches!(
            result,
            Err(SnapshotError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_failed_create_leaves_nothing_discoverable() {
        let temp_dir = TempDir::new().unwrap();
        let snapshots_dir = temp_dir.path().join("snapshots");
        let engine = SnapshotEngine::new(
            Arc::new(LiveStore::open(temp_dir.path().join("missing.db"))),
            snapshots_dir.clone(),
            Arc::new(Mutex::new(())),
        );

        assert!(engine.create().is_err());

        let entries: Vec<_> = fs::read_dir(&snapshots_dir).unwrap().collect();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_back_to_back_creates_get_distinct_ids() {
        let (engine, _temp) = test_engine(b"pull day");

        let first = engine.create().unwrap();
        let second = engine.create().unwrap();

        assert_ne!(first.id, second.id);
        assert!(first.id < second.id);
    }
}
