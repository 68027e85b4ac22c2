//! Snapshot builder
//!
//! Reads every record in the store and flattens it into a [`BackupBundle`].

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::PlannerResult;
use crate::models::{
    time, Absence, Discipline, Evaluation, Exam, Holiday, Note, Professor, Semester, Task,
};
use crate::storage::Storage;

use super::dto::{
    AbsenceDto, BackupBundle, DisciplineDto, EvaluationDto, ExamDto, HolidayDto, NoteDto,
    ProfessorDto, SemesterDto, TaskDto,
};

impl From<&Semester> for SemesterDto {
    fn from(semester: &Semester) -> Self {
        Self {
            id: semester.id,
            name: semester.name.clone(),
            start_date: semester.start_date,
            end_date: semester.end_date,
            is_active: semester.is_active,
        }
    }
}

impl From<&Discipline> for DisciplineDto {
    fn from(discipline: &Discipline) -> Self {
        Self {
            id: discipline.id,
            name: discipline.name.clone(),
            code: discipline.code.clone(),
            instructor: discipline.instructor.clone(),
            color_hex: discipline.color_hex.clone(),
            total_hours: discipline.total_hours,
            absence_limit: discipline.absence_limit,
            semester_id: discipline.semester_id,
        }
    }
}

impl From<&Task> for TaskDto {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            completed: task.completed,
            discipline_id: task.discipline_id,
        }
    }
}

impl From<&Exam> for ExamDto {
    fn from(exam: &Exam) -> Self {
        Self {
            id: exam.id,
            title: exam.title.clone(),
            description: exam.description.clone(),
            exam_date: exam.exam_date,
            score: exam.score,
            exam_type: Some(exam.exam_type.label().to_string()),
            discipline_id: exam.discipline_id,
        }
    }
}

impl From<&Absence> for AbsenceDto {
    fn from(absence: &Absence) -> Self {
        Self {
            id: absence.id,
            date: absence.date,
            hours: absence.hours,
            remark: absence.remark.clone(),
            discipline_id: absence.discipline_id,
        }
    }
}

impl From<&Note> for NoteDto {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            created_at: note.created_at,
            modified_at: note.modified_at,
            discipline_id: note.discipline_id,
        }
    }
}

impl From<&Evaluation> for EvaluationDto {
    fn from(evaluation: &Evaluation) -> Self {
        Self {
            id: evaluation.id,
            title: evaluation.title.clone(),
            score: evaluation.score,
            weight: evaluation.weight,
            date: evaluation.date,
            discipline_id: evaluation.discipline_id,
        }
    }
}

impl From<&Professor> for ProfessorDto {
    fn from(professor: &Professor) -> Self {
        Self {
            id: professor.id,
            name: professor.name.clone(),
            email: professor.email.clone(),
            department: professor.department.clone(),
            remarks: professor.remarks.clone(),
            title: Some(professor.title.label().to_string()),
            specialty: Some(professor.specialty.clone()),
            phone: Some(professor.phone.clone()),
            whatsapp: Some(professor.whatsapp.clone()),
            office_hours: Some(professor.office_hours.clone()),
            room: Some(professor.room.clone()),
            photo: professor.photo.clone(),
            discipline_ids: Some(professor.discipline_ids.clone()),
        }
    }
}

impl From<&Holiday> for HolidayDto {
    fn from(holiday: &Holiday) -> Self {
        Self {
            id: holiday.id,
            name: holiday.name.clone(),
            date: holiday.date,
            kind: Some(holiday.kind.label().to_string()),
            recurring: Some(holiday.recurring),
            blocks_classes: Some(holiday.blocks_classes),
        }
    }
}

fn flatten<'a, T, D>(records: &'a [T]) -> Vec<D>
where
    D: From<&'a T>,
{
    records.iter().map(D::from).collect()
}

/// Build a bundle from the current store contents, stamped with now
pub fn build_snapshot(storage: &Storage) -> PlannerResult<BackupBundle> {
    build_snapshot_at(storage, time::now())
}

/// Build a bundle from the current store contents
///
/// Records are emitted in id order, so two snapshots of the same store
/// differ only in their export date.
pub fn build_snapshot_at(storage: &Storage, export_date: DateTime<Utc>) -> PlannerResult<BackupBundle> {
    let mut bundle = BackupBundle::empty(time::to_seconds(export_date));

    bundle.semesters = flatten(&storage.semesters.get_all()?);
    bundle.disciplines = flatten(&storage.disciplines.get_all()?);
    bundle.tasks = flatten(&storage.tasks.get_all()?);
    bundle.exams = flatten(&storage.exams.get_all()?);
    bundle.absences = flatten(&storage.absences.get_all()?);
    bundle.notes = flatten(&storage.notes.get_all()?);
    bundle.evaluations = flatten(&storage.evaluations.get_all()?);
    bundle.professors = flatten(&storage.professors.get_all()?);
    bundle.holidays = flatten(&storage.holidays.get_all()?);

    debug!(records = bundle.counts().total(), "Built backup snapshot");
    Ok(bundle)
}
