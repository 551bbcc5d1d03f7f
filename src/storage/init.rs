//! Storage initialization
//!
//! Creates the directory layout and an empty live store on first run.

use crate::config::paths::LiftlogPaths;
use crate::error::{LiftlogError, LiftlogResult};

/// Initialize the storage layout
///
/// Creates the base, data, and snapshot directories, and an empty live store
/// file if one does not already exist. Safe to call on an already-initialized
/// directory.
pub fn initialize_storage(paths: &LiftlogPaths) -> LiftlogResult<()> {
    paths.ensure_directories()?;

    let store_path = paths.store_file();
    if !store_path.exists() {
        std::fs::write(&store_path, b"")
            .map_err(|e| LiftlogError::Storage(format!("Failed to create live store: {}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LiftlogPaths::with_base_dir(temp_dir.path().to_path_buf());

        initialize_storage(&paths).unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.snapshots_dir().exists());
        assert!(paths.store_file().exists());
    }

    #[test]
    fn test_initialize_preserves_existing_store() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LiftlogPaths::with_base_dir(temp_dir.path().to_path_buf());

        paths.ensure_directories().unwrap();
        std::fs::write(paths.store_file(), b"existing data").unwrap();

        initialize_storage(&paths).unwrap();

        assert_eq!(std::fs::read(paths.store_file()).unwrap(), b"existing data");
    }
}
