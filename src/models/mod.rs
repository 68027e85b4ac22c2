//! Core data models for MedPlanner
//!
//! This module contains the nine planner entities. Relationships are held as
//! typed ids rather than references: children carry their parent's id, and
//! professors carry the ids of the disciplines they teach.

pub mod absence;
pub mod discipline;
pub mod evaluation;
pub mod exam;
pub mod holiday;
pub mod ids;
pub mod note;
pub mod professor;
pub mod semester;
pub mod task;
pub mod time;

pub use absence::Absence;
pub use discipline::Discipline;
pub use evaluation::Evaluation;
pub use exam::{Exam, ExamType};
pub use holiday::{Holiday, HolidayKind};
pub use ids::{
    AbsenceId, DisciplineId, EvaluationId, ExamId, HolidayId, NoteId, ProfessorId, SemesterId,
    TaskId,
};
pub use note::Note;
pub use professor::{AcademicTitle, Professor};
pub use semester::Semester;
pub use task::Task;
