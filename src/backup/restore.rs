//! Restore engine
//!
//! Replaces the entire store with the contents of a [`BackupBundle`].
//! Records keep the ids they had in the bundle; foreign keys are resolved
//! against what the bundle itself contains, and a link to anything else is
//! dropped (set to none) rather than failing the restore.
//!
//! The restore is all-or-nothing: it runs inside [`Storage::transaction`],
//! so any rejected write puts the store back the way it was.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{PlannerError, PlannerResult};
use crate::models::{
    Absence, AcademicTitle, Discipline, DisciplineId, Evaluation, Exam, ExamType, Holiday,
    HolidayKind, Note, Professor, Semester, SemesterId, Task,
};
use crate::storage::{EntityCounts, Storage};

use super::dto::{
    AbsenceDto, BackupBundle, DisciplineDto, EvaluationDto, ExamDto, HolidayDto, NoteDto,
    ProfessorDto, SemesterDto, TaskDto,
};

impl From<SemesterDto> for Semester {
    fn from(dto: SemesterDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            start_date: dto.start_date,
            end_date: dto.end_date,
            is_active: dto.is_active,
        }
    }
}

impl From<DisciplineDto> for Discipline {
    fn from(dto: DisciplineDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            code: dto.code,
            instructor: dto.instructor,
            color_hex: dto.color_hex,
            total_hours: dto.total_hours,
            absence_limit: dto.absence_limit,
            semester_id: dto.semester_id,
        }
    }
}

impl From<TaskDto> for Task {
    fn from(dto: TaskDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            description: dto.description,
            due_date: dto.due_date,
            completed: dto.completed,
            discipline_id: dto.discipline_id,
        }
    }
}

impl From<ExamDto> for Exam {
    fn from(dto: ExamDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            description: dto.description,
            exam_date: dto.exam_date,
            score: dto.score,
            exam_type: dto
                .exam_type
                .as_deref()
                .map(ExamType::from_label)
                .unwrap_or_default(),
            discipline_id: dto.discipline_id,
        }
    }
}

impl From<AbsenceDto> for Absence {
    fn from(dto: AbsenceDto) -> Self {
        Self {
            id: dto.id,
            date: dto.date,
            hours: dto.hours,
            remark: dto.remark,
            discipline_id: dto.discipline_id,
        }
    }
}

impl From<NoteDto> for Note {
    fn from(dto: NoteDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            content: dto.content,
            created_at: dto.created_at,
            modified_at: dto.modified_at,
            discipline_id: dto.discipline_id,
        }
    }
}

impl From<EvaluationDto> for Evaluation {
    fn from(dto: EvaluationDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            score: dto.score,
            weight: dto.weight,
            date: dto.date,
            discipline_id: dto.discipline_id,
        }
    }
}

impl From<ProfessorDto> for Professor {
    fn from(dto: ProfessorDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            title: dto
                .title
                .as_deref()
                .map(AcademicTitle::from_label)
                .unwrap_or_default(),
            specialty: dto.specialty.unwrap_or_default(),
            department: dto.department,
            email: dto.email,
            phone: dto.phone.unwrap_or_default(),
            whatsapp: dto.whatsapp.unwrap_or_default(),
            office_hours: dto.office_hours.unwrap_or_default(),
            room: dto.room.unwrap_or_default(),
            remarks: dto.remarks,
            photo: dto.photo,
            discipline_ids: dto.discipline_ids.unwrap_or_default(),
        }
    }
}

impl From<HolidayDto> for Holiday {
    fn from(dto: HolidayDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            date: dto.date,
            kind: dto
                .kind
                .as_deref()
                .map(HolidayKind::from_label)
                .unwrap_or_default(),
            recurring: dto.recurring.unwrap_or(false),
            blocks_classes: dto.blocks_classes.unwrap_or(true),
        }
    }
}

/// Ids restored so far, used to resolve foreign keys
#[derive(Default)]
struct LookupTable {
    semesters: HashSet<SemesterId>,
    disciplines: HashSet<DisciplineId>,
    dropped: usize,
}

impl LookupTable {
    fn resolve<Id>(
        known: &HashSet<Id>,
        dropped: &mut usize,
        link: Option<Id>,
        owner: &'static str,
        owner_id: &dyn fmt::Display,
    ) -> Option<Id>
    where
        Id: Copy + Eq + Hash + fmt::Display,
    {
        let id = link?;
        if known.contains(&id) {
            Some(id)
        } else {
            warn!(entity = owner, id = %owner_id, missing = %id, "Dropping link to a record not in the backup");
            *dropped += 1;
            None
        }
    }

    fn semester(&mut self, link: Option<SemesterId>, owner: &'static str, owner_id: &dyn fmt::Display) -> Option<SemesterId> {
        Self::resolve(&self.semesters, &mut self.dropped, link, owner, owner_id)
    }

    fn discipline(
        &mut self,
        link: Option<DisciplineId>,
        owner: &'static str,
        owner_id: &dyn fmt::Display,
    ) -> Option<DisciplineId> {
        Self::resolve(&self.disciplines, &mut self.dropped, link, owner, owner_id)
    }
}

/// Outcome of a successful restore
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreSummary {
    /// Format version declared by the bundle
    pub version: String,
    /// When the bundle was exported
    pub export_date: DateTime<Utc>,
    /// Records now in the store
    pub restored: EntityCounts,
    /// Foreign keys that pointed outside the bundle and were cleared
    pub dropped_links: usize,
}

impl RestoreSummary {
    /// Get a one-line summary
    pub fn summary(&self) -> String {
        let mut text = format!(
            "Restored backup v{} from {}: {}",
            self.version,
            self.export_date.format("%Y-%m-%d %H:%M:%S UTC"),
            self.restored
        );
        if self.dropped_links > 0 {
            text.push_str(&format!(" ({} dangling links cleared)", self.dropped_links));
        }
        text
    }
}

/// Replace the whole store with `bundle`
///
/// On success the store holds exactly the bundle's records and has been
/// persisted. On failure the store is unchanged and the error is
/// [`PlannerError::StoreWriteFailure`].
pub fn restore(bundle: &BackupBundle, storage: &Storage) -> PlannerResult<RestoreSummary> {
    let dropped_links = storage
        .transaction(|store| apply(bundle, store))
        .map_err(|e| match e {
            PlannerError::StoreWriteFailure(_) => e,
            other => PlannerError::StoreWriteFailure(other.to_string()),
        })?;

    let restored = storage.counts()?;
    info!(
        version = %bundle.version,
        records = restored.total(),
        dropped_links,
        "Restored backup"
    );

    Ok(RestoreSummary {
        version: bundle.version.clone(),
        export_date: bundle.export_date,
        restored,
        dropped_links,
    })
}

// Parents go first so every child can be linked against the lookup table.
fn apply(bundle: &BackupBundle, store: &Storage) -> PlannerResult<usize> {
    store.clear_all()?;
    let mut table = LookupTable::default();

    for dto in &bundle.semesters {
        let semester = Semester::from(dto.clone());
        if let Err(err) = semester.validate() {
            warn!(id = %dto.id, error = %err, "Restoring invalid semester as is");
        }
        store.semesters.insert(semester)?;
        table.semesters.insert(dto.id);
    }

    for dto in &bundle.disciplines {
        let mut discipline = Discipline::from(dto.clone());
        if let Err(err) = discipline.validate() {
            warn!(id = %dto.id, error = %err, "Restoring invalid discipline as is");
        }
        discipline.semester_id = table.semester(dto.semester_id, "Discipline", &dto.id);
        store.disciplines.insert(discipline)?;
        table.disciplines.insert(dto.id);
    }

    for dto in &bundle.tasks {
        let mut task = Task::from(dto.clone());
        task.discipline_id = table.discipline(dto.discipline_id, "Task", &dto.id);
        store.tasks.insert(task)?;
    }

    for dto in &bundle.exams {
        let mut exam = Exam::from(dto.clone());
        exam.discipline_id = table.discipline(dto.discipline_id, "Exam", &dto.id);
        store.exams.insert(exam)?;
    }

    for dto in &bundle.absences {
        let mut absence = Absence::from(dto.clone());
        absence.discipline_id = table.discipline(dto.discipline_id, "Absence", &dto.id);
        store.absences.insert(absence)?;
    }

    for dto in &bundle.notes {
        let mut note = Note::from(dto.clone());
        note.discipline_id = table.discipline(dto.discipline_id, "Note", &dto.id);
        store.notes.insert(note)?;
    }

    for dto in &bundle.evaluations {
        let mut evaluation = Evaluation::from(dto.clone());
        evaluation.discipline_id = table.discipline(dto.discipline_id, "Evaluation", &dto.id);
        store.evaluations.insert(evaluation)?;
    }

    for dto in &bundle.professors {
        let mut professor = Professor::from(dto.clone());
        professor.discipline_ids = dto
            .discipline_ids
            .iter()
            .flatten()
            .filter_map(|id| table.discipline(Some(*id), "Professor", &dto.id))
            .collect();
        store.professors.insert(professor)?;
    }

    for dto in &bundle.holidays {
        store.holidays.insert(Holiday::from(dto.clone()))?;
    }

    Ok(table.dropped)
}
