//! Discipline model
//!
//! A discipline (course) owns tasks, exams, absences, notes and evaluations.
//! Those children point back at the discipline by id; deleting a discipline
//! cascades to all of them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{DisciplineId, SemesterId};

/// Color assigned to new disciplines
pub const DEFAULT_COLOR_HEX: &str = "#1B3FE8";

/// Fraction of the workload a student may miss before failing
pub const DEFAULT_ABSENCE_LIMIT: f64 = 0.25;

/// A course taken in a semester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discipline {
    pub id: DisciplineId,
    pub name: String,
    /// Short code shown on chips and reports (e.g. "ANAT")
    pub code: String,
    /// Free-text instructor name
    #[serde(default)]
    pub instructor: Option<String>,
    pub color_hex: String,
    /// Total workload in hours
    #[serde(default)]
    pub total_hours: Option<u32>,
    /// Absence limit as a fraction of total hours
    #[serde(default)]
    pub absence_limit: Option<f64>,
    #[serde(default)]
    pub semester_id: Option<SemesterId>,
}

impl Discipline {
    /// Create a new discipline with the default color and absence limit
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: DisciplineId::new(),
            name: name.into(),
            code: code.into(),
            instructor: None,
            color_hex: DEFAULT_COLOR_HEX.to_string(),
            total_hours: None,
            absence_limit: Some(DEFAULT_ABSENCE_LIMIT),
            semester_id: None,
        }
    }

    /// Create a new discipline attached to a semester
    pub fn in_semester(name: impl Into<String>, code: impl Into<String>, semester_id: SemesterId) -> Self {
        let mut discipline = Self::new(name, code);
        discipline.semester_id = Some(semester_id);
        discipline
    }

    /// Validate the discipline
    pub fn validate(&self) -> Result<(), DisciplineValidationError> {
        if self.name.trim().is_empty() {
            return Err(DisciplineValidationError::EmptyName);
        }
        if let Some(limit) = self.absence_limit {
            if !(0.0..=1.0).contains(&limit) {
                return Err(DisciplineValidationError::LimitOutOfRange(limit));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Validation errors for disciplines
#[derive(Debug, Clone, PartialEq)]
pub enum DisciplineValidationError {
    EmptyName,
    LimitOutOfRange(f64),
}

impl fmt::Display for DisciplineValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Discipline name cannot be empty"),
            Self::LimitOutOfRange(limit) => {
                write!(f, "Absence limit must be between 0 and 1, got {}", limit)
            }
        }
    }
}

impl std::error::Error for DisciplineValidationError {}
