//! Snapshot identity and manifest handling
//!
//! Each snapshot on disk is a pair of files in the snapshot directory:
//! `liftlog-<id>.snap` (the verbatim store copy) and `liftlog-<id>.json`
//! (the manifest). The manifest is only written after verification succeeds,
//! so anything discoverable through a manifest is a complete, verified
//! snapshot.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::SnapshotError;
use crate::storage::file_io;

/// Sortable, timestamp-derived snapshot identifier
///
/// Format: `YYYYMMDD-HHMMSS-mmm` (UTC). Lexicographic order equals
/// chronological order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Derive an identifier from a creation timestamp
    pub(crate) fn from_timestamp(ts: DateTime<Utc>) -> Self {
        Self(format!(
            "{}-{:03}",
            ts.format("%Y%m%d-%H%M%S"),
            ts.timestamp_subsec_millis()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SnapshotId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SnapshotId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Metadata for one point-in-time copy of the workout store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Identifier, derived from the creation timestamp
    pub id: SnapshotId,
    /// When the snapshot was created
    pub created_at: DateTime<Utc>,
    /// Size of the copy in bytes, measured at verification time
    pub size_bytes: u64,
    /// Hex-encoded SHA-256 of the copy
    pub checksum: String,
    /// True only after the written copy re-read to the same digest
    pub verified: bool,
}

impl Snapshot {
    /// Path of this snapshot's data file within `dir`
    pub fn data_path(&self, dir: &Path) -> PathBuf {
        data_path(dir, &self.id)
    }
}

/// Data file path for a snapshot id
pub(crate) fn data_path(dir: &Path, id: &SnapshotId) -> PathBuf {
    dir.join(format!("liftlog-{}.snap", id))
}

/// Manifest file path for a snapshot id
pub(crate) fn manifest_path(dir: &Path, id: &SnapshotId) -> PathBuf {
    dir.join(format!("liftlog-{}.json", id))
}

/// Hex-encoded SHA-256 digest
pub(crate) fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Parse a manifest file
pub(crate) fn read_manifest(path: &Path) -> Result<Snapshot, SnapshotError> {
    let bytes = fs::read(path).map_err(|e| SnapshotError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| SnapshotError::Manifest {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Persist a manifest atomically
pub(crate) fn write_manifest(dir: &Path, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let path = manifest_path(dir, &snapshot.id);
    let json = serde_json::to_vec_pretty(snapshot).map_err(|e| SnapshotError::Manifest {
        path: path.clone(),
        source: e,
    })?;
    file_io::write_bytes_atomic(&path, &json).map_err(|e| SnapshotError::Io { path, source: e })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use tempfile::TempDir;

    #[test]
    fn test_id_format() {
        let ts = Utc
            .with_ymd_and_hms(2026, 8, 5, 14, 25, 1)
            .unwrap()
            .with_nanosecond(123_000_000)
            .unwrap();
        let id = SnapshotId::from_timestamp(ts);
        assert_eq!(id.as_str(), "20260805-142501-123");
    }

    #[test]
    fn test_ids_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2026, 8, 5, 14, 25, 1).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 8, 5, 14, 25, 2).unwrap();

        assert!(SnapshotId::from_timestamp(earlier) < SnapshotId::from_timestamp(later));
    }

    #[test]
    fn test_file_names() {
        let dir = Path::new("/snapshots");
        let id = SnapshotId::from("20260805-142501-123");

        assert_eq!(
            data_path(dir, &id),
            Path::new("/snapshots/liftlog-20260805-142501-123.snap")
        );
        assert_eq!(
            manifest_path(dir, &id),
            Path::new("/snapshots/liftlog-20260805-142501-123.json")
        );
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(digest_hex(b"abc"), digest_hex(b"abc"));
        assert_ne!(digest_hex(b"abc"), digest_hex(b"abd"));
        assert_eq!(digest_hex(b"abc").len(), 64);
    }

    #[test]
    fn test_manifest_round_trip() {
        let temp_dir = TempDir::new().unwrap();

        let snapshot = Snapshot {
            id: SnapshotId::from("20260805-142501-123"),
            created_at: Utc::now(),
            size_bytes: 42,
            checksum: digest_hex(b"content"),
            verified: true,
        };

        write_manifest(temp_dir.path(), &snapshot).unwrap();

        let path = manifest_path(temp_dir.path(), &snapshot.id);
        let loaded = read_manifest(&path).unwrap();

        assert_eq!(loaded.id, snapshot.id);
        assert_eq!(loaded.size_bytes, 42);
        assert_eq!(loaded.checksum, snapshot.checksum);
        assert!(loaded.verified);
    }

    #[test]
    fn test_read_manifest_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("liftlog-bad.json");
        fs::write(&path, b"not json").unwrap();

        assert!(matches!(
            read_manifest(&path),
            Err(SnapshotError::Manifest { .. })
        ));
    }
}
