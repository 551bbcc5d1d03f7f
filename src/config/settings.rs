//! User settings for liftlog
//!
//! Manages the snapshot retention bound and the automated snapshot interval.
//! Settings are loaded once at startup from `config.json`, with environment
//! overrides applied on top, and treated as immutable for the process
//! lifetime.

use serde::{Deserialize, Serialize};

use super::paths::LiftlogPaths;
use crate::error::LiftlogError;

/// Snapshot and schedule settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSettings {
    /// Maximum number of snapshots to keep
    pub max_snapshots: u32,
    /// How often the automated schedule fires, in hours
    pub schedule_interval_hours: u64,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            max_snapshots: 30,
            schedule_interval_hours: 6,
        }
    }
}

/// User settings for liftlog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Snapshot retention and scheduling
    #[serde(default)]
    pub backup: BackupSettings,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backup: BackupSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    ///
    /// `LIFTLOG_MAX_SNAPSHOTS` and `LIFTLOG_SCHEDULE_INTERVAL_HOURS` override
    /// the persisted values.
    pub fn load_or_create(paths: &LiftlogPaths) -> Result<Self, LiftlogError> {
        let settings_path = paths.settings_file();

        let mut settings = if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| LiftlogError::Io(format!("Failed to read settings file: {}", e)))?;

            serde_json::from_str(&contents).map_err(|e| {
                LiftlogError::Config(format!("Failed to parse settings file: {}", e))
            })?
        } else {
            // Don't save yet - let caller decide when to persist
            Settings::default()
        };

        settings.apply_env_overrides()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LiftlogPaths) -> Result<(), LiftlogError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LiftlogError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| LiftlogError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), LiftlogError> {
        if let Ok(value) = std::env::var("LIFTLOG_MAX_SNAPSHOTS") {
            self.backup.max_snapshots = value.parse().map_err(|_| {
                LiftlogError::Config(format!("Invalid LIFTLOG_MAX_SNAPSHOTS value: {}", value))
            })?;
        }

        if let Ok(value) = std::env::var("LIFTLOG_SCHEDULE_INTERVAL_HOURS") {
            self.backup.schedule_interval_hours = value.parse().map_err(|_| {
                LiftlogError::Config(format!(
                    "Invalid LIFTLOG_SCHEDULE_INTERVAL_HOURS value: {}",
                    value
                ))
            })?;
        }

        Ok(())
    }
}
