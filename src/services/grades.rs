//! Grade service
//!
//! Weighted averages of a discipline's evaluations and the resulting
//! academic standing.

use std::fmt;

use crate::config::settings::Settings;
use crate::error::{PlannerError, PlannerResult};
use crate::models::{Discipline, DisciplineId, Evaluation, SemesterId};
use crate::storage::Storage;

/// Where a student stands in a discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Approved,
    /// Below passing, still above the warning grade
    Recovery,
    Failing,
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved => write!(f, "Approved"),
            Self::Recovery => write!(f, "Recovery"),
            Self::Failing => write!(f, "Failing"),
        }
    }
}

/// Grade summary for one discipline
#[derive(Debug, Clone)]
pub struct GradeReport {
    pub discipline: Discipline,
    pub evaluation_count: usize,
    pub average: Option<f64>,
    pub standing: Option<Standing>,
}

/// `sum(score * weight) / sum(weight)`
///
/// `None` without evaluations, `0.0` when every weight is zero.
pub fn weighted_average(evaluations: &[Evaluation]) -> Option<f64> {
    if evaluations.is_empty() {
        return None;
    }

    let total_weight: f64 = evaluations.iter().map(|e| e.weight).sum();
    if total_weight == 0.0 {
        return Some(0.0);
    }

    let weighted: f64 = evaluations.iter().map(|e| e.score * e.weight).sum();
    Some(weighted / total_weight)
}

/// Service for grade calculations
pub struct GradeService<'a> {
    storage: &'a Storage,
    passing_grade: f64,
    warning_grade: f64,
}

impl<'a> GradeService<'a> {
    /// Create a new grade service using the thresholds from `settings`
    pub fn new(storage: &'a Storage, settings: &Settings) -> Self {
        Self {
            storage,
            passing_grade: settings.passing_grade,
            warning_grade: settings.warning_grade,
        }
    }

    /// Classify an average against the configured thresholds
    pub fn standing(&self, average: f64) -> Standing {
        if average >= self.passing_grade {
            Standing::Approved
        } else if average >= self.warning_grade {
            Standing::Recovery
        } else {
            Standing::Failing
        }
    }

    /// Grade summary for one discipline
    pub fn discipline_report(&self, discipline_id: DisciplineId) -> PlannerResult<GradeReport> {
        let discipline = self
            .storage
            .disciplines
            .get(discipline_id)?
            .ok_or_else(|| PlannerError::discipline_not_found(discipline_id.to_string()))?;
        self.report_for(discipline)
    }

    /// Grade summaries for every discipline, optionally limited to a semester
    pub fn report_all(&self, semester: Option<SemesterId>) -> PlannerResult<Vec<GradeReport>> {
        let disciplines = match semester {
            Some(id) => self.storage.disciplines.filter(|d| d.semester_id == Some(id))?,
            None => self.storage.disciplines.get_all()?,
        };
        disciplines.into_iter().map(|d| self.report_for(d)).collect()
    }

    fn report_for(&self, discipline: Discipline) -> PlannerResult<GradeReport> {
        let evaluations = self
            .storage
            .evaluations
            .filter(|e| e.discipline_id == Some(discipline.id))?;
        let average = weighted_average(&evaluations);

        Ok(GradeReport {
            evaluation_count: evaluations.len(),
            standing: average.map(|avg| self.standing(avg)),
            average,
            discipline,
        })
    }
}
