//! Custom error types for liftlog
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Snapshot and restore failures are typed so
//! the command layer can render an operator-facing summary while the full
//! cause chain goes to the logs.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while creating or verifying snapshots
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The snapshot directory ran out of space mid-write
    #[error("not enough space in {dir} to write snapshot")]
    NoSpace {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The live store could not be read
    #[error("live store unreadable at {path}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The written copy did not read back to the same digest
    #[error("snapshot {id} failed checksum verification")]
    Corrupt { id: String },

    /// Any other I/O failure against the snapshot directory
    #[error("snapshot I/O failed for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot manifest could not be serialized or parsed
    #[error("invalid snapshot manifest at {path}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors produced by the restore orchestrator
///
/// Every failure path leaves the live store exactly as it was before the
/// restore attempt.
#[derive(Error, Debug)]
pub enum RestoreError {
    /// The caller did not supply the literal confirmation token
    #[error("restore requires explicit confirmation")]
    NotConfirmed,

    /// No snapshot with the requested identifier exists
    #[error("snapshot not found: {id}")]
    SnapshotNotFound { id: String },

    /// The target snapshot exists but is not verified
    #[error("snapshot {id} failed verification; refusing to restore")]
    SnapshotUnverified { id: String },

    /// The pre-restore safety snapshot could not be captured
    #[error("could not capture a safety snapshot of the current store")]
    SafetyBackupFailed(#[source] SnapshotError),

    /// The atomic replacement of the live store failed
    #[error("atomic swap of the live store failed")]
    SwapFailed(#[source] std::io::Error),
}

/// The main error type for liftlog operations
#[derive(Error, Debug)]
pub enum LiftlogError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Snapshot creation or verification errors
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Restore errors
    #[error(transparent)]
    Restore(#[from] RestoreError),
}

impl From<std::io::Error> for LiftlogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for liftlog operations
pub type LiftlogResult<T> = Result<T, LiftlogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LiftlogError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_snapshot_corrupt_display() {
        let err = SnapshotError::Corrupt {
            id: "20260101-120000-000".into(),
        };
        assert_eq!(
            err.to_string(),
            "snapshot 20260101-120000-000 failed checksum verification"
        );
    }

    #[test]
    fn test_restore_not_confirmed_display() {
        let err = RestoreError::NotConfirmed;
        assert_eq!(err.to_string(), "restore requires explicit confirmation");
    }

    #[test]
    fn test_restore_error_carries_cause() {
        let cause = SnapshotError::SourceUnavailable {
            path: PathBuf::from("/tmp/workouts.db"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let err = RestoreError::SafetyBackupFailed(cause);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let liftlog_err: LiftlogError = io_err.into();
        assert!(matches!(liftlog_err, LiftlogError::Io(_)));
    }
}
