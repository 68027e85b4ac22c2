//! Attendance service
//!
//! Compares the hours missed in a discipline against its absence limit.

use std::fmt;

use crate::config::settings::Settings;
use crate::error::{PlannerError, PlannerResult};
use crate::models::{Discipline, DisciplineId, SemesterId};
use crate::storage::Storage;

/// How close a discipline is to its absence limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    /// The discipline has no workload, so there is no limit
    NoWorkload,
    Ok,
    /// Half the allowed hours used
    Warning,
    /// 80% of the allowed hours used
    AtRisk,
    /// Limit reached
    Failed,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWorkload => write!(f, "No workload"),
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "Warning"),
            Self::AtRisk => write!(f, "At risk"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

impl RiskLevel {
    /// Level for a used/allowed ratio
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 1.0 {
            Self::Failed
        } else if ratio >= 0.8 {
            Self::AtRisk
        } else if ratio >= 0.5 {
            Self::Warning
        } else {
            Self::Ok
        }
    }
}

/// Attendance summary for one discipline
#[derive(Debug, Clone)]
pub struct AttendanceReport {
    pub discipline: Discipline,
    pub absent_hours: u64,
    /// Hours that may be missed; `None` without a workload
    pub limit_hours: Option<f64>,
    pub ratio: Option<f64>,
    pub risk: RiskLevel,
}

impl AttendanceReport {
    /// Hours still allowed before the limit is reached
    pub fn remaining_hours(&self) -> Option<f64> {
        self.limit_hours
            .map(|limit| (limit - self.absent_hours as f64).max(0.0))
    }
}

/// Service for attendance calculations
pub struct AttendanceService<'a> {
    storage: &'a Storage,
    default_limit: f64,
}

impl<'a> AttendanceService<'a> {
    /// Create a new attendance service
    pub fn new(storage: &'a Storage, settings: &Settings) -> Self {
        Self {
            storage,
            default_limit: settings.default_absence_limit,
        }
    }

    /// Attendance summary for one discipline
    pub fn discipline_report(&self, discipline_id: DisciplineId) -> PlannerResult<AttendanceReport> {
        let discipline = self
            .storage
            .disciplines
            .get(discipline_id)?
            .ok_or_else(|| PlannerError::discipline_not_found(discipline_id.to_string()))?;
        self.report_for(discipline)
    }

    /// Attendance summaries for every discipline, optionally limited to a semester
    pub fn report_all(&self, semester: Option<SemesterId>) -> PlannerResult<Vec<AttendanceReport>> {
        let disciplines = match semester {
            Some(id) => self.storage.disciplines.filter(|d| d.semester_id == Some(id))?,
            None => self.storage.disciplines.get_all()?,
        };
        disciplines.into_iter().map(|d| self.report_for(d)).collect()
    }

    fn report_for(&self, discipline: Discipline) -> PlannerResult<AttendanceReport> {
        let absent_hours: u64 = self
            .storage
            .absences
            .filter(|a| a.discipline_id == Some(discipline.id))?
            .iter()
            .map(|a| u64::from(a.hours))
            .sum();

        let total_hours = discipline.total_hours.unwrap_or(0);
        if total_hours == 0 {
            return Ok(AttendanceReport {
                discipline,
                absent_hours,
                limit_hours: None,
                ratio: None,
                risk: RiskLevel::NoWorkload,
            });
        }

        let fraction = discipline.absence_limit.unwrap_or(self.default_limit);
        let limit_hours = total_hours as f64 * fraction;
        let (ratio, risk) = if limit_hours > 0.0 {
            let ratio = absent_hours as f64 / limit_hours;
            (Some(ratio), RiskLevel::from_ratio(ratio))
        } else if absent_hours > 0 {
            (None, RiskLevel::Failed)
        } else {
            (None, RiskLevel::Ok)
        };

        Ok(AttendanceReport {
            discipline,
            absent_hours,
            limit_hours: Some(limit_hours),
            ratio,
            risk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::PlannerPaths;
    use crate::models::Absence;
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PlannerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn discipline_with_hours(storage: &Storage, total_hours: Option<u32>, absent: &[u32]) -> DisciplineId {
        let mut discipline = Discipline::new("Anatomy", "ANAT");
        discipline.total_hours = total_hours;
        let id = discipline.id;
        storage.disciplines.insert(discipline).unwrap();
        for hours in absent {
            storage.absences.insert(Absence::new(Utc::now(), *hours, id)).unwrap();
        }
        id
    }

    #[test]
    fn test_risk_from_ratio() {
        assert_eq!(RiskLevel::from_ratio(0.0), RiskLevel::Ok);
        assert_eq!(RiskLevel::from_ratio(0.5), RiskLevel::Warning);
        assert_eq!(RiskLevel::from_ratio(0.8), RiskLevel::AtRisk);
        assert_eq!(RiskLevel::from_ratio(1.0), RiskLevel::Failed);
    }

    #[test]
    fn test_report_against_limit() {
        let (_temp, storage) = create_test_storage();
        // 80h at 25% allows 20h
        let id = discipline_with_hours(&storage, Some(80), &[4, 6, 6]);

        let service = AttendanceService::new(&storage, &Settings::default());
        let report = service.discipline_report(id).unwrap();
        assert_eq!(report.absent_hours, 16);
        assert_eq!(report.limit_hours, Some(20.0));
        assert_eq!(report.risk, RiskLevel::AtRisk);
        assert_eq!(report.remaining_hours(), Some(4.0));
    }

    #[test]
    fn test_no_workload() {
        let (_temp, storage) = create_test_storage();
        let id = discipline_with_hours(&storage, None, &[2]);

        let service = AttendanceService::new(&storage, &Settings::default());
        let report = service.discipline_report(id).unwrap();
        assert_eq!(report.risk, RiskLevel::NoWorkload);
        assert!(report.ratio.is_none());
    }

    #[test]
    fn test_zero_limit_with_absence_fails() {
        let (_temp, storage) = create_test_storage();
        let mut discipline = Discipline::new("Ethics", "ETH");
        discipline.total_hours = Some(40);
        discipline.absence_limit = Some(0.0);
        let id = discipline.id;
        storage.disciplines.insert(discipline).unwrap();
        storage.absences.insert(Absence::new(Utc::now(), 1, id)).unwrap();

        let service = AttendanceService::new(&storage, &Settings::default());
        assert_eq!(service.discipline_report(id).unwrap().risk, RiskLevel::Failed);
        assert_eq!(service.report_all(None).unwrap().len(), 1);
    }

    #[test]
    fn test_large_absence_hours_do_not_overflow() {
        let (_temp, storage) = create_test_storage();
        let id = discipline_with_hours(&storage, Some(80), &[4_000_000_000, 4_000_000_000]);

        let service = AttendanceService::new(&storage, &Settings::default());
        let reports = service.report_all(None).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].absent_hours, 8_000_000_000);
        assert_eq!(reports[0].risk, RiskLevel::Failed);
        assert_eq!(service.discipline_report(id).unwrap().remaining_hours(), Some(0.0));
    }
}
