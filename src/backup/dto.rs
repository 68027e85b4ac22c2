//! Backup document schema
//!
//! Flat, reference-free records for each entity type. Relationships are
//! carried as foreign-key ids. Field names follow the published backup file
//! format, which is shared with earlier releases of the planner.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::professor::photo_encoding;
use crate::models::{
    AbsenceId, Discipline, DisciplineId, EvaluationId, ExamId, HolidayId, NoteId, ProfessorId,
    Semester, SemesterId, TaskId,
};
use crate::storage::EntityCounts;

/// Format version written by this release
pub const BACKUP_FORMAT_VERSION: &str = "1.3";

/// Serde adapter for the fixed backup date format: `2024-03-01T08:00:00Z`
///
/// Decoding accepts any RFC 3339 offset and normalizes to UTC.
pub mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| serde::de::Error::custom(format!("invalid date {:?}: {}", text, e)))
    }
}

/// A complete snapshot of the planner database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupBundle {
    pub version: String,
    #[serde(rename = "exportDate", with = "iso8601")]
    pub export_date: DateTime<Utc>,
    #[serde(rename = "semestres")]
    pub semesters: Vec<SemesterDto>,
    #[serde(rename = "disciplinas")]
    pub disciplines: Vec<DisciplineDto>,
    #[serde(rename = "tarefas")]
    pub tasks: Vec<TaskDto>,
    #[serde(rename = "provas")]
    pub exams: Vec<ExamDto>,
    #[serde(rename = "faltas")]
    pub absences: Vec<AbsenceDto>,
    #[serde(rename = "anotacoes")]
    pub notes: Vec<NoteDto>,
    #[serde(rename = "avaliacoes")]
    pub evaluations: Vec<EvaluationDto>,
    #[serde(rename = "professores")]
    pub professors: Vec<ProfessorDto>,
    #[serde(rename = "feriados")]
    pub holidays: Vec<HolidayDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterDto {
    pub id: SemesterId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "dataInicio", with = "iso8601")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "dataFim", with = "iso8601")]
    pub end_date: DateTime<Utc>,
    #[serde(rename = "isAtivo")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisciplineDto {
    pub id: DisciplineId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "sigla")]
    pub code: String,
    #[serde(rename = "professor", skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(rename = "corHexCode")]
    pub color_hex: String,
    #[serde(rename = "cargaHorariaTotal", skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<u32>,
    #[serde(rename = "limiteFaltasPercentual", skip_serializing_if = "Option::is_none")]
    pub absence_limit: Option<f64>,
    #[serde(rename = "semestreId", skip_serializing_if = "Option::is_none")]
    pub semester_id: Option<SemesterId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDto {
    pub id: TaskId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "dataEntrega", with = "iso8601")]
    pub due_date: DateTime<Utc>,
    #[serde(rename = "isConcluida")]
    pub completed: bool,
    #[serde(rename = "disciplinaId", skip_serializing_if = "Option::is_none")]
    pub discipline_id: Option<DisciplineId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamDto {
    pub id: ExamId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "dataProva", with = "iso8601")]
    pub exam_date: DateTime<Utc>,
    #[serde(rename = "notaAlcancada", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Exam type label; absent in files written before exam types existed
    #[serde(rename = "tipo", skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<String>,
    #[serde(rename = "disciplinaId", skip_serializing_if = "Option::is_none")]
    pub discipline_id: Option<DisciplineId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsenceDto {
    pub id: AbsenceId,
    #[serde(rename = "data", with = "iso8601")]
    pub date: DateTime<Utc>,
    #[serde(rename = "quantidadeHoras")]
    pub hours: u32,
    #[serde(rename = "observacao", skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(rename = "disciplinaId", skip_serializing_if = "Option::is_none")]
    pub discipline_id: Option<DisciplineId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDto {
    pub id: NoteId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "conteudo")]
    pub content: String,
    #[serde(rename = "dataCriacao", with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "dataModificacao", with = "iso8601")]
    pub modified_at: DateTime<Utc>,
    #[serde(rename = "disciplinaId", skip_serializing_if = "Option::is_none")]
    pub discipline_id: Option<DisciplineId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDto {
    pub id: EvaluationId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "notaObtida")]
    pub score: f64,
    #[serde(rename = "peso")]
    pub weight: f64,
    #[serde(rename = "data", with = "iso8601")]
    pub date: DateTime<Utc>,
    #[serde(rename = "disciplinaId", skip_serializing_if = "Option::is_none")]
    pub discipline_id: Option<DisciplineId>,
}

/// Professor record; everything after `remarks` arrived in 1.3.6 and is
/// optional so older files still decode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessorDto {
    pub id: ProfessorId,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "departamento")]
    pub department: String,
    #[serde(rename = "anotacoes")]
    pub remarks: String,
    #[serde(rename = "titulo", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "especialidade", skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(rename = "telefone", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(rename = "horarioAtendimento", skip_serializing_if = "Option::is_none")]
    pub office_hours: Option<String>,
    #[serde(rename = "sala", skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(
        rename = "foto",
        default,
        with = "photo_encoding",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo: Option<Vec<u8>>,
    #[serde(rename = "disciplinaIds", skip_serializing_if = "Option::is_none")]
    pub discipline_ids: Option<Vec<DisciplineId>>,
}

/// Holiday record; `tipo`, `recorrente` and `bloqueiaAulas` are optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidayDto {
    pub id: HolidayId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "data", with = "iso8601")]
    pub date: DateTime<Utc>,
    #[serde(rename = "tipo", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "recorrente", skip_serializing_if = "Option::is_none")]
    pub recurring: Option<bool>,
    #[serde(rename = "bloqueiaAulas", skip_serializing_if = "Option::is_none")]
    pub blocks_classes: Option<bool>,
}

/// Result of checking a bundle's foreign keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub counts: EntityCounts,
    /// Foreign keys pointing at a parent that is not in the bundle
    pub dangling_links: usize,
    /// Ids that appear more than once within one entity type
    pub duplicate_ids: usize,
    /// Semesters and disciplines that fail their own validation
    pub invalid_records: usize,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.dangling_links == 0 && self.duplicate_ids == 0 && self.invalid_records == 0
    }
}

fn count_duplicates<I, T>(ids: I) -> usize
where
    I: IntoIterator<Item = T>,
    T: std::hash::Hash + Eq + Copy,
{
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| !seen.insert(*id)).count()
}

impl BackupBundle {
    /// Create an empty bundle stamped with the current format version
    pub fn empty(export_date: DateTime<Utc>) -> Self {
        Self {
            version: BACKUP_FORMAT_VERSION.to_string(),
            export_date,
            semesters: Vec::new(),
            disciplines: Vec::new(),
            tasks: Vec::new(),
            exams: Vec::new(),
            absences: Vec::new(),
            notes: Vec::new(),
            evaluations: Vec::new(),
            professors: Vec::new(),
            holidays: Vec::new(),
        }
    }

    /// Number of records per entity type
    pub fn counts(&self) -> EntityCounts {
        EntityCounts {
            semesters: self.semesters.len(),
            disciplines: self.disciplines.len(),
            tasks: self.tasks.len(),
            exams: self.exams.len(),
            absences: self.absences.len(),
            notes: self.notes.len(),
            evaluations: self.evaluations.len(),
            professors: self.professors.len(),
            holidays: self.holidays.len(),
        }
    }

    /// Check foreign keys and id uniqueness without touching any store
    ///
    /// Dangling links are not an error: a restore drops them to null.
    /// Duplicate ids will make a restore fail. Invalid records are restored
    /// as they are.
    pub fn check_integrity(&self) -> IntegrityReport {
        let semester_ids: HashSet<SemesterId> = self.semesters.iter().map(|s| s.id).collect();
        let discipline_ids: HashSet<DisciplineId> =
            self.disciplines.iter().map(|d| d.id).collect();

        let dangling_discipline = |link: &Option<DisciplineId>| {
            link.map_or(false, |id| !discipline_ids.contains(&id))
        };

        let mut dangling_links = self
            .disciplines
            .iter()
            .filter(|d| d.semester_id.map_or(false, |id| !semester_ids.contains(&id)))
            .count();
        dangling_links += self.tasks.iter().filter(|t| dangling_discipline(&t.discipline_id)).count();
        dangling_links += self.exams.iter().filter(|e| dangling_discipline(&e.discipline_id)).count();
        dangling_links += self
            .absences
            .iter()
            .filter(|a| dangling_discipline(&a.discipline_id))
            .count();
        dangling_links += self.notes.iter().filter(|n| dangling_discipline(&n.discipline_id)).count();
        dangling_links += self
            .evaluations
            .iter()
            .filter(|e| dangling_discipline(&e.discipline_id))
            .count();
        dangling_links += self
            .professors
            .iter()
            .flat_map(|p| p.discipline_ids.iter().flatten())
            .filter(|id| !discipline_ids.contains(*id))
            .count();

        let duplicate_ids = count_duplicates(self.semesters.iter().map(|s| s.id))
            + count_duplicates(self.disciplines.iter().map(|d| d.id))
            + count_duplicates(self.tasks.iter().map(|t| t.id))
            + count_duplicates(self.exams.iter().map(|e| e.id))
            + count_duplicates(self.absences.iter().map(|a| a.id))
            + count_duplicates(self.notes.iter().map(|n| n.id))
            + count_duplicates(self.evaluations.iter().map(|e| e.id))
            + count_duplicates(self.professors.iter().map(|p| p.id))
            + count_duplicates(self.holidays.iter().map(|h| h.id));

        let invalid_records = self
            .semesters
            .iter()
            .filter(|s| Semester::from((*s).clone()).validate().is_err())
            .count()
            + self
                .disciplines
                .iter()
                .filter(|d| Discipline::from((*d).clone()).validate().is_err())
                .count();

        IntegrityReport {
            counts: self.counts(),
            dangling_links,
            duplicate_ids,
            invalid_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn semester_dto(id: SemesterId) -> SemesterDto {
        SemesterDto {
            id,
            name: "2024.1".into(),
            start_date: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap(),
            is_active: true,
        }
    }

    fn discipline_dto(semester_id: Option<SemesterId>) -> DisciplineDto {
        DisciplineDto {
            id: DisciplineId::new(),
            name: "Anatomy".into(),
            code: "ANAT".into(),
            instructor: None,
            color_hex: "#1B3FE8".into(),
            total_hours: Some(80),
            absence_limit: Some(0.25),
            semester_id,
        }
    }

    #[test]
    fn test_dates_use_fixed_second_precision_format() {
        let dto = semester_dto(SemesterId::new());
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["dataInicio"], "2024-02-01T00:00:00Z");
        assert_eq!(json["isAtivo"], true);
    }

    #[test]
    fn test_dates_accept_other_offsets() {
        let json = r#"{"id":"550e8400-e29b-41d4-a716-446655440000","nome":"2024.1",
            "dataInicio":"2024-02-01T00:00:00-03:00","dataFim":"2024-06-30T00:00:00Z","isAtivo":false}"#;
        let dto: SemesterDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.start_date, Utc.with_ymd_and_hms(2024, 2, 1, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let json = serde_json::to_value(discipline_dto(None)).unwrap();
        assert!(json.get("semestreId").is_none());
        assert!(json.get("professor").is_none());
        assert_eq!(json["cargaHorariaTotal"], 80);
    }

    #[test]
    fn test_integrity_counts_dangling_links() {
        let semester_id = SemesterId::new();
        let mut bundle = BackupBundle::empty(Utc::now());
        bundle.semesters.push(semester_dto(semester_id));
        bundle.disciplines.push(discipline_dto(Some(semester_id)));
        bundle.disciplines.push(discipline_dto(Some(SemesterId::new())));

        let report = bundle.check_integrity();
        assert_eq!(report.dangling_links, 1);
        assert_eq!(report.duplicate_ids, 0);
        assert_eq!(report.counts.disciplines, 2);
    }

    #[test]
    fn test_integrity_counts_duplicate_ids() {
        let semester_id = SemesterId::new();
        let mut bundle = BackupBundle::empty(Utc::now());
        bundle.semesters.push(semester_dto(semester_id));
        bundle.semesters.push(semester_dto(semester_id));

        let report = bundle.check_integrity();
        assert_eq!(report.duplicate_ids, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_integrity_counts_invalid_records() {
        let mut bundle = BackupBundle::empty(Utc::now());
        let mut backwards = semester_dto(SemesterId::new());
        std::mem::swap(&mut backwards.start_date, &mut backwards.end_date);
        bundle.semesters.push(backwards);
        let mut over_limit = discipline_dto(None);
        over_limit.absence_limit = Some(1.5);
        bundle.disciplines.push(over_limit);
        bundle.disciplines.push(discipline_dto(None));

        let report = bundle.check_integrity();
        assert_eq!(report.invalid_records, 2);
        assert_eq!(report.dangling_links, 0);
        assert!(!report.is_clean());
    }
}
