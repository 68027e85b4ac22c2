//! Storage layer for MedPlanner
//!
//! Provides JSON file storage with atomic writes, one repository per entity
//! type, the delete rules that tie the entities together, and an
//! all-or-nothing [`Storage::transaction`] used by bulk operations such as a
//! backup restore.

pub mod file_io;
pub mod repository;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use file_io::{read_json, write_json_atomic};
pub use repository::{Record, Repository};

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::PlannerPaths;
use crate::error::{PlannerError, PlannerResult};
use crate::models::{
    Absence, Discipline, DisciplineId, Evaluation, Exam, Holiday, HolidayId, Note, Professor,
    ProfessorId, Semester, SemesterId, Task,
};

/// Number of records per entity type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub semesters: usize,
    pub disciplines: usize,
    pub tasks: usize,
    pub exams: usize,
    pub absences: usize,
    pub notes: usize,
    pub evaluations: usize,
    pub professors: usize,
    pub holidays: usize,
}

impl EntityCounts {
    /// Sum over all entity types
    pub fn total(&self) -> usize {
        self.semesters
            + self.disciplines
            + self.tasks
            + self.exams
            + self.absences
            + self.notes
            + self.evaluations
            + self.professors
            + self.holidays
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for EntityCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} semesters, {} disciplines, {} tasks, {} exams, {} absences, {} notes, \
             {} evaluations, {} professors, {} holidays",
            self.semesters,
            self.disciplines,
            self.tasks,
            self.exams,
            self.absences,
            self.notes,
            self.evaluations,
            self.professors,
            self.holidays
        )
    }
}

/// In-memory copy of every repository, used to roll back a transaction
struct StorageSnapshot {
    semesters: HashMap<SemesterId, Semester>,
    disciplines: HashMap<DisciplineId, Discipline>,
    tasks: HashMap<<Task as Record>::Id, Task>,
    exams: HashMap<<Exam as Record>::Id, Exam>,
    absences: HashMap<<Absence as Record>::Id, Absence>,
    notes: HashMap<<Note as Record>::Id, Note>,
    evaluations: HashMap<<Evaluation as Record>::Id, Evaluation>,
    professors: HashMap<ProfessorId, Professor>,
    holidays: HashMap<HolidayId, Holiday>,
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: PlannerPaths,
    audit: AuditLogger,
    pub semesters: Repository<Semester>,
    pub disciplines: Repository<Discipline>,
    pub tasks: Repository<Task>,
    pub exams: Repository<Exam>,
    pub absences: Repository<Absence>,
    pub notes: Repository<Note>,
    pub evaluations: Repository<Evaluation>,
    pub professors: Repository<Professor>,
    pub holidays: Repository<Holiday>,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: PlannerPaths) -> Result<Self, PlannerError> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            semesters: Repository::new(paths.semesters_file()),
            disciplines: Repository::new(paths.disciplines_file()),
            tasks: Repository::new(paths.tasks_file()),
            exams: Repository::new(paths.exams_file()),
            absences: Repository::new(paths.absences_file()),
            notes: Repository::new(paths.notes_file()),
            evaluations: Repository::new(paths.evaluations_file()),
            professors: Repository::new(paths.professors_file()),
            holidays: Repository::new(paths.holidays_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &PlannerPaths {
        &self.paths
    }

    /// Get the audit logger
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Append entries to the audit log after a change has been committed
    ///
    /// The change is already on disk, so a failed append is logged and
    /// otherwise ignored.
    pub fn log(&self, entries: &[AuditEntry]) {
        if let Err(err) = self.audit.log_batch(entries) {
            warn!(
                error = %err,
                path = %self.audit.path().display(),
                entries = entries.len(),
                "Failed to write audit log"
            );
        }
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), PlannerError> {
        self.semesters.load()?;
        self.disciplines.load()?;
        self.tasks.load()?;
        self.exams.load()?;
        self.absences.load()?;
        self.notes.load()?;
        self.evaluations.load()?;
        self.professors.load()?;
        self.holidays.load()?;
        Ok(())
    }

    /// Save all data to disk
    ///
    /// Every file is staged before any is replaced, so a serialization or
    /// disk-full error leaves all nine files as they were. The final renames
    /// are not atomic as a group.
    pub fn save_all(&self) -> Result<(), PlannerError> {
        let staged = [
            (self.semesters.stage(), self.semesters.path()),
            (self.disciplines.stage(), self.disciplines.path()),
            (self.tasks.stage(), self.tasks.path()),
            (self.exams.stage(), self.exams.path()),
            (self.absences.stage(), self.absences.path()),
            (self.notes.stage(), self.notes.path()),
            (self.evaluations.stage(), self.evaluations.path()),
            (self.professors.stage(), self.professors.path()),
            (self.holidays.stage(), self.holidays.path()),
        ];

        if let Some(err) = staged.iter().find_map(|(r, _)| r.as_ref().err()) {
            let message = err.to_string();
            for temp in staged.iter().filter_map(|(r, _)| r.as_ref().ok()) {
                file_io::discard_staged(temp);
            }
            return Err(PlannerError::Storage(message));
        }

        for (temp, target) in staged.iter().filter_map(|(r, p)| r.as_ref().ok().map(|t| (t, p))) {
            file_io::commit_staged(temp, target)?;
        }

        Ok(())
    }

    /// Count records of every type
    pub fn counts(&self) -> PlannerResult<EntityCounts> {
        Ok(EntityCounts {
            semesters: self.semesters.count()?,
            disciplines: self.disciplines.count()?,
            tasks: self.tasks.count()?,
            exams: self.exams.count()?,
            absences: self.absences.count()?,
            notes: self.notes.count()?,
            evaluations: self.evaluations.count()?,
            professors: self.professors.count()?,
            holidays: self.holidays.count()?,
        })
    }

    /// Remove every record of every type (in memory only)
    pub fn clear_all(&self) -> PlannerResult<()> {
        self.holidays.clear()?;
        self.professors.clear()?;
        self.evaluations.clear()?;
        self.notes.clear()?;
        self.absences.clear()?;
        self.exams.clear()?;
        self.tasks.clear()?;
        self.disciplines.clear()?;
        self.semesters.clear()?;
        Ok(())
    }

    fn snapshot(&self) -> PlannerResult<StorageSnapshot> {
        Ok(StorageSnapshot {
            semesters: self.semesters.snapshot()?,
            disciplines: self.disciplines.snapshot()?,
            tasks: self.tasks.snapshot()?,
            exams: self.exams.snapshot()?,
            absences: self.absences.snapshot()?,
            notes: self.notes.snapshot()?,
            evaluations: self.evaluations.snapshot()?,
            professors: self.professors.snapshot()?,
            holidays: self.holidays.snapshot()?,
        })
    }

    fn rollback(&self, snapshot: StorageSnapshot) -> PlannerResult<()> {
        self.semesters.rollback(snapshot.semesters)?;
        self.disciplines.rollback(snapshot.disciplines)?;
        self.tasks.rollback(snapshot.tasks)?;
        self.exams.rollback(snapshot.exams)?;
        self.absences.rollback(snapshot.absences)?;
        self.notes.rollback(snapshot.notes)?;
        self.evaluations.rollback(snapshot.evaluations)?;
        self.professors.rollback(snapshot.professors)?;
        self.holidays.rollback(snapshot.holidays)?;
        Ok(())
    }

    /// Run `f` as a single unit of work and persist the result
    ///
    /// If `f` fails, every repository is put back to the state it had before
    /// the call and nothing is written to disk. If persisting fails, memory
    /// is rolled back and the previous state is written again; should that
    /// second write fail as well, the files may hold a mix of both states
    /// and the caller has to retry.
    pub fn transaction<T, F>(&self, f: F) -> PlannerResult<T>
    where
        F: FnOnce(&Self) -> PlannerResult<T>,
    {
        let snapshot = self.snapshot()?;

        let value = match f(self) {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, "Rolling back transaction");
                self.rollback(snapshot)?;
                return Err(err);
            }
        };

        if let Err(err) = self.save_all() {
            warn!(error = %err, "Failed to persist transaction, rolling back");
            self.rollback(snapshot)?;
            if let Err(resave) = self.save_all() {
                warn!(error = %resave, "Failed to rewrite previous state after rollback");
            }
            return Err(err);
        }

        Ok(value)
    }

    /// Delete a semester; its disciplines stay, unlinked
    pub fn delete_semester(&self, id: SemesterId) -> PlannerResult<Semester> {
        let removed = self.transaction(|store| {
            let semester = store
                .semesters
                .delete(id)?
                .ok_or_else(|| PlannerError::semester_not_found(id.to_string()))?;
            store.disciplines.update_all(|d| {
                let linked = d.semester_id == Some(id);
                if linked {
                    d.semester_id = None;
                }
                linked
            })?;
            Ok(semester)
        })?;

        self.log(&[AuditEntry::delete(
            EntityType::Semester,
            id.to_string(),
            Some(removed.name.clone()),
            &removed,
        )]);
        Ok(removed)
    }

    /// Delete a discipline together with everything it owns
    pub fn delete_discipline(&self, id: DisciplineId) -> PlannerResult<Discipline> {
        let (removed, cascaded) = self.transaction(|store| {
            let discipline = store
                .disciplines
                .delete(id)?
                .ok_or_else(|| PlannerError::discipline_not_found(id.to_string()))?;
            let cascaded = store.remove_children_of(id)?;
            Ok((discipline, cascaded))
        })?;

        debug!(discipline = %id, cascaded, "Deleted discipline");
        self.log(&[AuditEntry::delete(
            EntityType::Discipline,
            id.to_string(),
            Some(removed.name.clone()),
            &removed,
        )]);
        Ok(removed)
    }

    /// Remove every child of a discipline and unlink it from professors
    ///
    /// Returns the number of child records removed.
    fn remove_children_of(&self, id: DisciplineId) -> PlannerResult<usize> {
        let owned = Some(id);
        let mut removed = 0;
        removed += self.tasks.delete_where(|t| t.discipline_id == owned)?.len();
        removed += self.exams.delete_where(|e| e.discipline_id == owned)?.len();
        removed += self.absences.delete_where(|a| a.discipline_id == owned)?.len();
        removed += self.notes.delete_where(|n| n.discipline_id == owned)?.len();
        removed += self.evaluations.delete_where(|e| e.discipline_id == owned)?.len();
        self.professors.update_all(|p| {
            let before = p.discipline_ids.len();
            p.discipline_ids.retain(|d| *d != id);
            p.discipline_ids.len() != before
        })?;
        Ok(removed)
    }

    /// Delete a professor
    pub fn delete_professor(&self, id: ProfessorId) -> PlannerResult<Professor> {
        let removed = self.transaction(|store| {
            store.professors.delete(id)?.ok_or_else(|| PlannerError::NotFound {
                entity_type: "Professor",
                identifier: id.to_string(),
            })
        })?;

        self.log(&[AuditEntry::delete(
            EntityType::Professor,
            id.to_string(),
            Some(removed.name.clone()),
            &removed,
        )]);
        Ok(removed)
    }

    /// Delete a holiday
    pub fn delete_holiday(&self, id: HolidayId) -> PlannerResult<Holiday> {
        let removed = self.transaction(|store| {
            store.holidays.delete(id)?.ok_or_else(|| PlannerError::NotFound {
                entity_type: "Holiday",
                identifier: id.to_string(),
            })
        })?;

        self.log(&[AuditEntry::delete(
            EntityType::Holiday,
            id.to_string(),
            Some(removed.name.clone()),
            &removed,
        )]);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PlannerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn at(day: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn seed(storage: &Storage) -> (SemesterId, DisciplineId, ProfessorId) {
        let semester = Semester::new("2024.1", at(1), at(30));
        let discipline = Discipline::in_semester("Anatomy", "ANAT", semester.id);
        let mut professor = Professor::new("Helena Souza");
        professor.teach(discipline.id);

        let ids = (semester.id, discipline.id, professor.id);
        storage.semesters.insert(semester).unwrap();
        storage.disciplines.insert(discipline).unwrap();
        storage.professors.insert(professor).unwrap();
        storage
            .tasks
            .insert(Task::for_discipline("Read ch.3", at(10), ids.1))
            .unwrap();
        storage
            .evaluations
            .insert(Evaluation::new("Quiz 1", 8.0, at(5), ids.1))
            .unwrap();
        storage.save_all().unwrap();
        ids
    }

    #[test]
    fn test_storage_creation() {
        let (temp_dir, storage) = create_test_storage();

        assert!(temp_dir.path().join("data").exists());
        assert!(temp_dir.path().join("backups").exists());
        assert!(storage.counts().unwrap().is_empty());
    }

    #[test]
    fn test_save_all_and_reload() {
        let (temp_dir, storage) = create_test_storage();
        seed(&storage);

        let paths = PlannerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut reloaded = Storage::new(paths).unwrap();
        reloaded.load_all().unwrap();

        assert_eq!(reloaded.counts().unwrap(), storage.counts().unwrap());
    }

    #[test]
    fn test_delete_semester_nullifies_disciplines() {
        let (_temp, storage) = create_test_storage();
        let (semester_id, discipline_id, _) = seed(&storage);

        storage.delete_semester(semester_id).unwrap();

        let discipline = storage.disciplines.get(discipline_id).unwrap().unwrap();
        assert!(discipline.semester_id.is_none());
        assert_eq!(storage.semesters.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_discipline_cascades() {
        let (_temp, storage) = create_test_storage();
        let (_, discipline_id, professor_id) = seed(&storage);

        storage.delete_discipline(discipline_id).unwrap();

        assert_eq!(storage.tasks.count().unwrap(), 0);
        assert_eq!(storage.evaluations.count().unwrap(), 0);
        let professor = storage.professors.get(professor_id).unwrap().unwrap();
        assert!(professor.discipline_ids.is_empty());

        let audit = storage.audit().read_all().unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].entity_type, EntityType::Discipline);
    }

    #[test]
    fn test_delete_missing_discipline_is_not_found() {
        let (_temp, storage) = create_test_storage();
        let err = storage.delete_discipline(DisciplineId::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let (_temp, storage) = create_test_storage();
        seed(&storage);
        let before = storage.counts().unwrap();

        let result: PlannerResult<()> = storage.transaction(|store| {
            store.clear_all()?;
            Err(PlannerError::StoreWriteFailure("boom".into()))
        });

        assert!(result.is_err());
        assert_eq!(storage.counts().unwrap(), before);
    }

    #[test]
    fn test_delete_commits_when_audit_log_is_unwritable() {
        let (temp_dir, storage) = create_test_storage();
        let (_, discipline_id, _) = seed(&storage);
        std::fs::create_dir_all(storage.paths().audit_log()).unwrap();

        let removed = storage.delete_discipline(discipline_id).unwrap();
        assert_eq!(removed.id, discipline_id);

        let paths = PlannerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut reloaded = Storage::new(paths).unwrap();
        reloaded.load_all().unwrap();
        assert!(!reloaded.disciplines.exists(discipline_id).unwrap());
        assert_eq!(reloaded.tasks.count().unwrap(), 0);
    }
}
