//! Path management for liftlog
//!
//! Provides XDG-compliant path resolution for configuration, the live workout
//! store, and snapshots.
//!
//! ## Path Resolution Order
//!
//! 1. `LIFTLOG_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/liftlog` or `~/.config/liftlog`
//! 3. Windows: `%APPDATA%\liftlog`

use std::path::PathBuf;

use crate::error::LiftlogError;

/// Manages all paths used by liftlog
#[derive(Debug, Clone)]
pub struct LiftlogPaths {
    /// Base directory for all liftlog data
    base_dir: PathBuf,
}

impl LiftlogPaths {
    /// Create a new LiftlogPaths instance
    ///
    /// Path resolution:
    /// 1. `LIFTLOG_DATA_DIR` env var (explicit override)
    /// 2. Unix: `$XDG_CONFIG_HOME/liftlog` or `~/.config/liftlog`
    /// 3. Windows: `%APPDATA%\liftlog`
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, LiftlogError> {
        let base_dir = if let Ok(custom) = std::env::var("LIFTLOG_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create LiftlogPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/liftlog/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (~/.config/liftlog/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the snapshot directory (~/.config/liftlog/snapshots/)
    pub fn snapshots_dir(&self) -> PathBuf {
        self.base_dir.join("snapshots")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the live workout store
    pub fn store_file(&self) -> PathBuf {
        self.data_dir().join("workouts.db")
    }

    /// Ensure all required directories exist
    ///
    /// Creates:
    /// - Base directory (~/.config/liftlog/)
    /// - Data directory (~/.config/liftlog/data/)
    /// - Snapshot directory (~/.config/liftlog/snapshots/)
    pub fn ensure_directories(&self) -> Result<(), LiftlogError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| LiftlogError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| LiftlogError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.snapshots_dir()).map_err(|e| {
            LiftlogError::Io(format!("Failed to create snapshot directory: {}", e))
        })?;

        Ok(())
    }

    /// Check if liftlog has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, LiftlogError> {
    // Unix (Linux/macOS): Use XDG_CONFIG_HOME if set, otherwise ~/.config
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| {
            std::env::var("HOME").map(|home| PathBuf::from(home).join(".config"))
        })
        .map_err(|_| LiftlogError::Config("Could not determine home directory".into()))?;
    Ok(config_base.join("liftlog"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, LiftlogError> {
    // Windows: Use APPDATA
    let appdata = std::env::var("APPDATA")
        .map_err(|_| LiftlogError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("liftlog"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LiftlogPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.snapshots_dir(), temp_dir.path().join("snapshots"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        env::set_var("LIFTLOG_DATA_DIR", custom_path);

        let paths = LiftlogPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());

        env::remove_var("LIFTLOG_DATA_DIR");
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LiftlogPaths::with_base_dir(temp_dir.path().to_path_buf());

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.snapshots_dir().exists());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LiftlogPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.store_file(),
            temp_dir.path().join("data").join("workouts.db")
        );
    }
}
