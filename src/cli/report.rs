//! CLI commands for reports
//!
//! Grade and attendance summaries per discipline.

use std::str::FromStr;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::{PlannerError, PlannerResult};
use crate::models::SemesterId;
use crate::services::{AttendanceService, GradeService};
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Weighted grade average and standing per discipline
    Grades {
        /// Limit to a semester (defaults to the active semester)
        #[arg(short, long)]
        semester: Option<String>,

        /// Include every discipline regardless of semester
        #[arg(long, conflicts_with = "semester")]
        all: bool,
    },

    /// Absence hours against each discipline's limit
    Attendance {
        /// Limit to a semester (defaults to the active semester)
        #[arg(short, long)]
        semester: Option<String>,

        /// Include every discipline regardless of semester
        #[arg(long, conflicts_with = "semester")]
        all: bool,
    },
}

/// Handle a report command
pub fn handle_report_command(storage: &Storage, settings: &Settings, cmd: ReportCommands) -> PlannerResult<()> {
    match cmd {
        ReportCommands::Grades { semester, all } => {
            let semester = resolve_semester(settings, semester.as_deref(), all)?;
            handle_grades_report(storage, settings, semester)
        }
        ReportCommands::Attendance { semester, all } => {
            let semester = resolve_semester(settings, semester.as_deref(), all)?;
            handle_attendance_report(storage, settings, semester)
        }
    }
}

fn resolve_semester(settings: &Settings, semester: Option<&str>, all: bool) -> PlannerResult<Option<SemesterId>> {
    if all {
        return Ok(None);
    }
    match semester {
        Some(text) => SemesterId::from_str(text)
            .map(Some)
            .map_err(|e| PlannerError::Validation(format!("Invalid semester id '{}': {}", text, e))),
        None => Ok(settings.active_semester),
    }
}

fn handle_grades_report(storage: &Storage, settings: &Settings, semester: Option<SemesterId>) -> PlannerResult<()> {
    let reports = GradeService::new(storage, settings).report_all(semester)?;

    if reports.is_empty() {
        println!("No disciplines found.");
        return Ok(());
    }

    println!("{:<30} {:>6} {:>8}  Standing", "Discipline", "Evals", "Average");
    println!("{}", "-".repeat(60));
    for report in reports {
        let (average, standing) = match (report.average, report.standing) {
            (Some(avg), Some(standing)) => (format!("{:.2}", avg), standing.to_string()),
            _ => ("-".to_string(), "No grades".to_string()),
        };
        println!(
            "{:<30} {:>6} {:>8}  {}",
            report.discipline.to_string(),
            report.evaluation_count,
            average,
            standing
        );
    }
    Ok(())
}

fn handle_attendance_report(
    storage: &Storage,
    settings: &Settings,
    semester: Option<SemesterId>,
) -> PlannerResult<()> {
    let reports = AttendanceService::new(storage, settings).report_all(semester)?;

    if reports.is_empty() {
        println!("No disciplines found.");
        return Ok(());
    }

    println!("{:<30} {:>7} {:>7}  Status", "Discipline", "Absent", "Limit");
    println!("{}", "-".repeat(60));
    for report in reports {
        let limit = report
            .limit_hours
            .map(|h| format!("{:.1}h", h))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<30} {:>6}h {:>7}  {}",
            report.discipline.to_string(),
            report.absent_hours,
            limit,
            report.risk
        );
    }
    Ok(())
}
