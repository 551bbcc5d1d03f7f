//! Live workout store handle
//!
//! The store is a single opaque file. This handle is the required capability
//! boundary for the backup system: a quiesced read for consistent copies, and
//! an atomic swap for restores. Hosts embedding a real database must route
//! writes through the same handle so that the read/write lock actually
//! quiesces the file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::storage::file_io;

/// Handle to the live workout store file
///
/// The `RwLock` guards the file content, not in-memory state: readers of the
/// store share the lock, a quiesced copy takes a read guard (excluding
/// writers for the duration of the copy), and only the swap takes the write
/// guard, keeping the unavailability window to a single rename.
#[derive(Debug)]
pub struct LiveStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl LiveStore {
    /// Create a handle for the store at the given path
    pub fn open(path: PathBuf) -> Self {
        Self {
            path,
            lock: RwLock::new(()),
        }
    }

    /// Path of the live store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the store file exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the full store content under a shared guard
    ///
    /// Concurrent readers are unaffected; writers are excluded for the
    /// duration of the copy, which is what makes the copy internally
    /// consistent.
    pub fn quiesced_read(&self) -> io::Result<Vec<u8>> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        fs::read(&self.path)
    }

    /// Replace the store content under an exclusive guard
    pub fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        file_io::write_bytes_atomic(&self.path, bytes)
    }

    /// Atomically replace the store with an already-staged file
    ///
    /// The staging file must live on the same filesystem. The exclusive guard
    /// is held only for the rename itself; if the rename fails the live store
    /// is untouched.
    pub fn swap_from(&self, staging: &Path) -> io::Result<()> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        fs::rename(staging, &self.path)
    }
}
