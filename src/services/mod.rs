//! Service layer for MedPlanner
//!
//! Domain calculations on top of the storage layer: grade averages,
//! attendance limits and the holiday calendar.

pub mod attendance;
pub mod grades;
pub mod holidays;

pub use attendance::{AttendanceReport, AttendanceService, RiskLevel};
pub use grades::{weighted_average, GradeReport, GradeService, Standing};
pub use holidays::{HolidayService, NATIONAL_HOLIDAYS};
