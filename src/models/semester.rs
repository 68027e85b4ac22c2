//! Semester model
//!
//! A semester groups disciplines over a date range. Deleting a semester
//! leaves its disciplines in place with no semester link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::SemesterId;

/// An academic semester (e.g. "2024.1")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    pub id: SemesterId,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Whether this is the semester the student is currently taking
    #[serde(default)]
    pub is_active: bool,
}

impl Semester {
    /// Create a new inactive semester
    pub fn new(name: impl Into<String>, start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Self {
        Self {
            id: SemesterId::new(),
            name: name.into(),
            start_date: super::time::to_seconds(start_date),
            end_date: super::time::to_seconds(end_date),
            is_active: false,
        }
    }

    /// Check whether a moment falls inside this semester
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start_date && at <= self.end_date
    }

    /// Validate the semester
    pub fn validate(&self) -> Result<(), SemesterValidationError> {
        if self.name.trim().is_empty() {
            return Err(SemesterValidationError::EmptyName);
        }
        if self.end_date < self.start_date {
            return Err(SemesterValidationError::EndsBeforeStart);
        }
        Ok(())
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for semesters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemesterValidationError {
    EmptyName,
    EndsBeforeStart,
}

impl fmt::Display for SemesterValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Semester name cannot be empty"),
            Self::EndsBeforeStart => write!(f, "Semester cannot end before it starts"),
        }
    }
}

impl std::error::Error for SemesterValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn spring() -> Semester {
        Semester::new(
            "2024.1",
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_new_semester_is_inactive() {
        let semester = spring();
        assert!(!semester.is_active);
        assert!(semester.validate().is_ok());
    }

    #[test]
    fn test_contains() {
        let semester = spring();
        assert!(semester.contains(Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()));
        assert!(!semester.contains(Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_validation() {
        let mut semester = spring();
        std::mem::swap(&mut semester.start_date, &mut semester.end_date);
        assert_eq!(
            semester.validate(),
            Err(SemesterValidationError::EndsBeforeStart)
        );

        semester.name = "  ".into();
        assert_eq!(semester.validate(), Err(SemesterValidationError::EmptyName));
    }
}
