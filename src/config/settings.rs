//! User settings for MedPlanner
//!
//! Manages user preferences including backup retention, import safety,
//! grading thresholds and the active semester filter.

use serde::{Deserialize, Serialize};

use super::paths::PlannerPaths;
use crate::error::PlannerError;
use crate::models::SemesterId;
use crate::storage::write_json_atomic;

/// Backup retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Number of daily backups to keep
    pub daily_count: u32,
    /// Number of monthly backups to keep
    pub monthly_count: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self {
            daily_count: 30,
            monthly_count: 12,
        }
    }
}

/// User settings for MedPlanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Backup retention policy
    #[serde(default)]
    pub backup_retention: BackupRetention,

    /// Take an automatic backup of the current data before an import
    #[serde(default = "default_true")]
    pub backup_before_import: bool,

    /// Pretty-print exported backups
    #[serde(default = "default_true")]
    pub pretty_export: bool,

    /// Weighted average at or above which a discipline is passed
    #[serde(default = "default_passing_grade")]
    pub passing_grade: f64,

    /// Weighted average at or above which a discipline is in recovery
    #[serde(default = "default_warning_grade")]
    pub warning_grade: f64,

    /// Absence limit used when a discipline does not define one
    #[serde(default = "default_absence_limit")]
    pub default_absence_limit: f64,

    /// Semester that reports are filtered to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_semester: Option<SemesterId>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_passing_grade() -> f64 {
    7.0
}

fn default_warning_grade() -> f64 {
    5.0
}

fn default_absence_limit() -> f64 {
    0.25
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backup_retention: BackupRetention::default(),
            backup_before_import: true,
            pretty_export: true,
            passing_grade: default_passing_grade(),
            warning_grade: default_warning_grade(),
            default_absence_limit: default_absence_limit(),
            active_semester: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &PlannerPaths) -> Result<Self, PlannerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                PlannerError::FileIo(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                PlannerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &PlannerPaths) -> Result<(), PlannerError> {
        paths.ensure_directories()?;

        write_json_atomic(paths.settings_file(), self)
            .map_err(|e| PlannerError::Config(format!("Failed to write settings file: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.backup_before_import);
        assert_eq!(settings.backup_retention.daily_count, 30);
        assert_eq!(settings.backup_retention.monthly_count, 12);
        assert_eq!(settings.passing_grade, 7.0);
        assert!(settings.active_semester.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PlannerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.backup_before_import = false;
        settings.active_semester = Some(SemesterId::new());

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert!(!loaded.backup_before_import);
        assert_eq!(loaded.active_semester, settings.active_semester);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"pretty_export": false}"#).unwrap();
        assert!(!settings.pretty_export);
        assert_eq!(settings.warning_grade, 5.0);
        assert_eq!(settings.default_absence_limit, 0.25);
    }
}
