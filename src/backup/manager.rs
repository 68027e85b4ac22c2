//! Backup manager for MedPlanner
//!
//! Writes backup documents to user-chosen files (export), replaces the store
//! from them (import), and keeps automatic rolling backups with a
//! configurable retention policy.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::audit::{AuditEntry, Operation};
use crate::config::paths::PlannerPaths;
use crate::config::settings::BackupRetention;
use crate::error::{PlannerError, PlannerResult};
use crate::storage::{EntityCounts, Storage};

use super::codec;
use super::dto::IntegrityReport;
use super::restore::{restore, RestoreSummary};
use super::snapshot::build_snapshot;

/// Metadata about a backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    /// Backup filename
    pub filename: String,
    /// Full path to backup
    pub path: PathBuf,
    /// When the backup was created
    pub created_at: DateTime<Utc>,
    /// Size in bytes
    pub size_bytes: u64,
    /// Whether this is a monthly backup (kept longer)
    pub is_monthly: bool,
}

/// Result of writing a backup document
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub path: PathBuf,
    pub counts: EntityCounts,
    pub size_bytes: u64,
}

/// Result of an import
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub restore: RestoreSummary,
    /// Automatic backup taken before the store was replaced
    pub safety_backup: Option<PathBuf>,
}

/// What a backup file contains, read without touching the store
#[derive(Debug, Clone)]
pub struct BackupInspection {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub integrity: IntegrityReport,
}

/// Suggested file name for a user export made on `date`
pub fn default_export_filename(date: NaiveDate) -> String {
    format!("MedPlanner_Backup_{}.json", date.format("%Y-%m-%d"))
}

/// Manages exports, imports, backup creation and retention
pub struct BackupManager {
    /// Path to backup directory
    backup_dir: PathBuf,
    /// Retention policy
    retention: BackupRetention,
}

impl BackupManager {
    /// Create a new BackupManager
    pub fn new(paths: &PlannerPaths, retention: BackupRetention) -> Self {
        Self {
            backup_dir: paths.backup_dir(),
            retention,
        }
    }

    /// Write the whole store to `path` as a backup document
    pub fn export_data(&self, storage: &Storage, path: &Path, pretty: bool) -> PlannerResult<ExportReport> {
        let bundle = build_snapshot(storage)?;
        let bytes = codec::encode_with(&bundle, pretty)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                PlannerError::FileIo(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        fs::write(path, &bytes).map_err(|e| {
            PlannerError::FileIo(format!("Failed to write {}: {}", path.display(), e))
        })?;

        let counts = bundle.counts();
        storage.log(&[AuditEntry::database(
            Operation::Export,
            path.display().to_string(),
            counts.to_string(),
        )]);
        info!(path = %path.display(), records = counts.total(), "Exported backup");

        Ok(ExportReport {
            path: path.to_path_buf(),
            counts,
            size_bytes: bytes.len() as u64,
        })
    }

    /// Replace the whole store with the backup document at `path`
    ///
    /// The file is fully read and decoded before anything changes. When
    /// `backup_first` is set and the store is not empty, a rolling backup of
    /// the current data is written first and old backups are pruned.
    pub fn import_data(&self, storage: &Storage, path: &Path, backup_first: bool) -> PlannerResult<ImportReport> {
        let bytes = fs::read(path).map_err(|e| {
            PlannerError::FileIo(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let bundle = codec::decode(&bytes)?;

        let safety_backup = if backup_first && !storage.counts()?.is_empty() {
            let (backup, pruned) = self.create_backup_with_retention(storage)?;
            debug!(pruned = pruned.len(), "Took safety backup before import");
            Some(backup)
        } else {
            None
        };

        let summary = restore(&bundle, storage)?;

        storage.log(&[AuditEntry::database(
            Operation::Import,
            path.display().to_string(),
            summary.restored.to_string(),
        )]);

        Ok(ImportReport {
            restore: summary,
            safety_backup,
        })
    }

    /// Decode a backup document and report on it without restoring
    pub fn inspect(&self, path: &Path) -> PlannerResult<BackupInspection> {
        let bytes = fs::read(path).map_err(|e| {
            PlannerError::FileIo(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let (bundle, version) = codec::decode_versioned(&bytes)?;

        Ok(BackupInspection {
            version: version.to_string(),
            export_date: bundle.export_date,
            integrity: bundle.check_integrity(),
        })
    }

    /// Create a rolling backup of all data
    ///
    /// Returns the path to the created backup file.
    pub fn create_backup(&self, storage: &Storage) -> PlannerResult<PathBuf> {
        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            PlannerError::FileIo(format!("Failed to create backup directory: {}", e))
        })?;

        let now = Utc::now();
        let filename = format!(
            "backup-{}-{:03}.json",
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_millis()
        );
        let backup_path = self.backup_dir.join(&filename);

        let bundle = build_snapshot(storage)?;
        let bytes = codec::encode(&bundle)?;

        fs::write(&backup_path, bytes).map_err(|e| {
            PlannerError::FileIo(format!("Failed to write backup file: {}", e))
        })?;

        storage.log(&[AuditEntry::database(
            Operation::Backup,
            backup_path.display().to_string(),
            bundle.counts().to_string(),
        )]);
        debug!(path = %backup_path.display(), "Created rolling backup");

        Ok(backup_path)
    }

    /// Restore the store from one of the rolling backups
    pub fn restore_backup(&self, storage: &Storage, filename: &str) -> PlannerResult<RestoreSummary> {
        let info = self.get_backup(filename)?.ok_or_else(|| PlannerError::NotFound {
            entity_type: "Backup",
            identifier: filename.to_string(),
        })?;
        Ok(self.import_data(storage, &info.path, false)?.restore)
    }

    /// List all available backups
    pub fn list_backups(&self) -> PlannerResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_dir).map_err(|e| {
            PlannerError::FileIo(format!("Failed to read backup directory: {}", e))
        })? {
            let entry = entry.map_err(|e| {
                PlannerError::FileIo(format!("Failed to read directory entry: {}", e))
            })?;

            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(info) = self.parse_backup_info(&path) {
                    backups.push(info);
                }
            }
        }

        // Newest first
        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(backups)
    }

    fn parse_backup_info(&self, path: &Path) -> Option<BackupInfo> {
        let filename = path.file_name()?.to_string_lossy().to_string();

        // backup-YYYYMMDD-HHMMSS[-mmm].json
        let date_part = filename.strip_prefix("backup-")?.strip_suffix(".json")?;
        let created_at = parse_backup_timestamp(date_part)?;

        let size_bytes = fs::metadata(path).ok()?.len();

        Some(BackupInfo {
            filename,
            path: path.to_path_buf(),
            created_at,
            size_bytes,
            is_monthly: created_at.day() == 1,
        })
    }

    /// Delete backups beyond the retention policy, returning what was removed
    pub fn enforce_retention(&self) -> PlannerResult<Vec<PathBuf>> {
        let backups = self.list_backups()?;
        let mut deleted = Vec::new();

        let (monthly, daily): (Vec<_>, Vec<_>) = backups.into_iter().partition(|b| b.is_monthly);

        let expired = daily
            .into_iter()
            .skip(self.retention.daily_count as usize)
            .chain(monthly.into_iter().skip(self.retention.monthly_count as usize));

        for backup in expired {
            fs::remove_file(&backup.path).map_err(|e| {
                PlannerError::FileIo(format!("Failed to delete old backup: {}", e))
            })?;
            deleted.push(backup.path);
        }

        if !deleted.is_empty() {
            info!(count = deleted.len(), "Pruned old backups");
        }

        Ok(deleted)
    }

    /// Create a backup and then enforce retention policy
    pub fn create_backup_with_retention(&self, storage: &Storage) -> PlannerResult<(PathBuf, Vec<PathBuf>)> {
        let backup_path = self.create_backup(storage)?;
        let deleted = self.enforce_retention()?;
        Ok((backup_path, deleted))
    }

    /// Get backup directory path
    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    /// Get a specific backup by filename
    pub fn get_backup(&self, filename: &str) -> PlannerResult<Option<BackupInfo>> {
        let path = self.backup_dir.join(filename);
        if path.exists() {
            Ok(self.parse_backup_info(&path))
        } else {
            Ok(None)
        }
    }

    /// Get the most recent backup
    pub fn get_latest_backup(&self) -> PlannerResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }
}

/// Parse the timestamp part of a backup filename
///
/// Accepts `YYYYMMDD-HHMMSS` and `YYYYMMDD-HHMMSS-mmm`.
fn parse_backup_timestamp(date_str: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let date_part = parts[0];
    let time_part = parts[1];
    let millis: u32 = match parts.get(2) {
        Some(ms) => ms.parse().ok()?,
        None => 0,
    };

    let all_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(date_part, 8) || !all_digits(time_part, 6) {
        return None;
    }

    let year: i32 = date_part[0..4].parse().ok()?;
    let month: u32 = date_part[4..6].parse().ok()?;
    let day: u32 = date_part[6..8].parse().ok()?;
    let hour: u32 = time_part[0..2].parse().ok()?;
    let minute: u32 = time_part[2..4].parse().ok()?;
    let second: u32 = time_part[4..6].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = chrono::NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?;

    Some(DateTime::from_naive_utc_and_offset(date.and_time(time), Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::EntityType;
    use crate::models::{Discipline, Semester, Task};
    use tempfile::TempDir;

    fn create_test_manager() -> (BackupManager, Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PlannerPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();

        let retention = BackupRetention {
            daily_count: 3,
            monthly_count: 2,
        };

        let manager = BackupManager::new(&paths, retention);
        let storage = Storage::new(paths).unwrap();
        (manager, storage, temp_dir)
    }

    fn seed(storage: &Storage) {
        let now = Utc::now();
        let semester = Semester::new("2024.1", now, now);
        let discipline = Discipline::in_semester("Anatomy", "ANAT", semester.id);
        let task = Task::for_discipline("Atlas", now, discipline.id);
        storage.semesters.insert(semester).unwrap();
        storage.disciplines.insert(discipline).unwrap();
        storage.tasks.insert(task).unwrap();
        storage.save_all().unwrap();
    }

    #[test]
    fn test_default_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(default_export_filename(date), "MedPlanner_Backup_2024-03-09.json");
    }

    #[test]
    fn test_export_then_import_elsewhere() {
        let (manager, storage, temp) = create_test_manager();
        seed(&storage);

        let path = temp.path().join("out").join("export.json");
        let report = manager.export_data(&storage, &path, true).unwrap();
        assert!(path.exists());
        assert_eq!(report.counts.total(), 3);

        let (other_manager, other_storage, _other_temp) = create_test_manager();
        let imported = other_manager.import_data(&other_storage, &path, true).unwrap();
        assert_eq!(imported.restore.restored, report.counts);
        // Empty store, nothing to protect
        assert!(imported.safety_backup.is_none());
    }

    #[test]
    fn test_import_takes_safety_backup() {
        let (manager, storage, temp) = create_test_manager();
        seed(&storage);
        let path = temp.path().join("export.json");
        manager.export_data(&storage, &path, false).unwrap();

        let report = manager.import_data(&storage, &path, true).unwrap();
        let backup = report.safety_backup.unwrap();
        assert!(backup.exists());

        let operations: Vec<Operation> = storage
            .audit()
            .read_all()
            .unwrap()
            .iter()
            .map(|e| e.operation)
            .collect();
        assert_eq!(operations, vec![Operation::Export, Operation::Backup, Operation::Import]);
    }

    #[test]
    fn test_malformed_import_leaves_store_untouched() {
        let (manager, storage, temp) = create_test_manager();
        seed(&storage);
        let before = storage.counts().unwrap();

        let path = temp.path().join("broken.json");
        fs::write(&path, r#"{"version": "1.3", "exportDate": "2024-05-01T12:00:00Z", "semestres": []}"#).unwrap();

        let err = manager.import_data(&storage, &path, true).unwrap_err();
        assert!(err.is_malformed_backup());
        assert_eq!(storage.counts().unwrap(), before);
        assert!(manager.list_backups().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_file_io() {
        let (manager, storage, temp) = create_test_manager();
        let err = manager
            .import_data(&storage, &temp.path().join("nope.json"), false)
            .unwrap_err();
        assert!(matches!(err, PlannerError::FileIo(_)));
    }

    #[test]
    fn test_inspect_reports_counts() {
        let (manager, storage, temp) = create_test_manager();
        seed(&storage);
        let path = temp.path().join("export.json");
        manager.export_data(&storage, &path, true).unwrap();

        let inspection = manager.inspect(&path).unwrap();
        assert_eq!(inspection.version, "1.3");
        assert_eq!(inspection.integrity.counts.disciplines, 1);
        assert!(inspection.integrity.is_clean());
    }

    #[test]
    fn test_create_backup() {
        let (manager, storage, _temp) = create_test_manager();

        let backup_path = manager.create_backup(&storage).unwrap();
        assert!(backup_path.exists());
        assert!(backup_path.to_string_lossy().contains("backup-"));

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries[0].entity_type, EntityType::Database);
    }

    #[test]
    fn test_list_backups() {
        let (manager, storage, _temp) = create_test_manager();

        manager.create_backup(&storage).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(100));
        manager.create_backup(&storage).unwrap();

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 2);
        assert!(backups[0].created_at >= backups[1].created_at);
    }

    #[test]
    fn test_retention_policy() {
        let (manager, storage, _temp) = create_test_manager();

        for _ in 0..5 {
            manager.create_backup(&storage).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(50));
        }

        // On the 1st every backup counts as monthly
        let kept = if Utc::now().day() == 1 { 2 } else { 3 };

        let deleted = manager.enforce_retention().unwrap();
        assert_eq!(deleted.len(), 5 - kept);
        assert_eq!(manager.list_backups().unwrap().len(), kept);
    }

    #[test]
    fn test_restore_backup_by_name() {
        let (manager, storage, _temp) = create_test_manager();
        seed(&storage);
        let path = manager.create_backup(&storage).unwrap();

        storage.clear_all().unwrap();
        storage.save_all().unwrap();

        let filename = path.file_name().unwrap().to_string_lossy().to_string();
        let summary = manager.restore_backup(&storage, &filename).unwrap();
        assert_eq!(summary.restored.total(), 3);

        assert!(manager.restore_backup(&storage, "backup-missing.json").unwrap_err().is_not_found());
    }

    #[test]
    fn test_get_latest_backup() {
        let (manager, storage, _temp) = create_test_manager();

        assert!(manager.get_latest_backup().unwrap().is_none());

        let path = manager.create_backup(&storage).unwrap();
        let latest = manager.get_latest_backup().unwrap().unwrap();
        assert_eq!(latest.path, path);
    }

    #[test]
    fn test_parse_backup_timestamp() {
        let timestamp = parse_backup_timestamp("20251127-143022").unwrap();
        assert_eq!((timestamp.year(), timestamp.month(), timestamp.day()), (2025, 11, 27));

        let timestamp = parse_backup_timestamp("20251127-143022-456").unwrap();
        assert_eq!(timestamp.timestamp_subsec_millis(), 456);

        assert!(parse_backup_timestamp("2025-11").is_none());
        assert!(parse_backup_timestamp("20251327-143022").is_none());
        assert!(parse_backup_timestamp("202é112-143022").is_none());
        assert!(parse_backup_timestamp("20251127-1430é").is_none());
    }

    #[test]
    fn test_list_skips_non_ascii_names() {
        let (manager, storage, _temp) = create_test_manager();
        manager.create_backup(&storage).unwrap();
        fs::write(manager.backup_dir().join("backup-202é112-143022.json"), "{}").unwrap();

        assert_eq!(manager.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn test_repeated_imports_respect_retention() {
        let (manager, storage, temp) = create_test_manager();
        seed(&storage);
        let path = temp.path().join("export.json");
        manager.export_data(&storage, &path, false).unwrap();

        for _ in 0..5 {
            let report = manager.import_data(&storage, &path, true).unwrap();
            assert!(report.safety_backup.is_some());
            std::thread::sleep(std::time::Duration::from_millis(20));
        }

        // On the 1st every backup counts as monthly
        let kept = if Utc::now().day() == 1 { 2 } else { 3 };
        assert_eq!(manager.list_backups().unwrap().len(), kept);
    }

    #[test]
    fn test_import_succeeds_when_audit_log_is_unwritable() {
        let (manager, storage, temp) = create_test_manager();
        let path = temp.path().join("export.json");
        seed(&storage);
        manager.export_data(&storage, &path, false).unwrap();
        storage.clear_all().unwrap();
        storage.save_all().unwrap();

        let audit_log = storage.paths().audit_log();
        fs::remove_file(&audit_log).unwrap();
        fs::create_dir_all(&audit_log).unwrap();

        let report = manager.import_data(&storage, &path, false).unwrap();
        assert_eq!(report.restore.restored.total(), 3);
        assert_eq!(storage.counts().unwrap().total(), 3);
    }

    #[test]
    fn test_create_backup_with_retention() {
        let (manager, storage, _temp) = create_test_manager();
        let (new_backup, _deleted) = manager.create_backup_with_retention(&storage).unwrap();
        assert!(new_backup.exists());
    }
}
