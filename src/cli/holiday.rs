//! Holiday CLI commands

use chrono::{Datelike, Local, NaiveDate};
use clap::Subcommand;

use crate::error::{PlannerError, PlannerResult};
use crate::services::HolidayService;
use crate::storage::Storage;

/// Holiday subcommands
#[derive(Subcommand, Debug)]
pub enum HolidayCommands {
    /// Add the national holidays for a year
    Seed {
        /// Year to seed (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Show the holidays on a date
    Check {
        /// Date (YYYY-MM-DD)
        date: String,
    },

    /// List all holidays
    List,
}

/// Handle a holiday command
pub fn handle_holiday_command(storage: &Storage, cmd: HolidayCommands) -> PlannerResult<()> {
    let service = HolidayService::new(storage);

    match cmd {
        HolidayCommands::Seed { year } => {
            let year = year.unwrap_or_else(|| Local::now().year());
            let added = service.seed_national_holidays(year)?;
            if added.is_empty() {
                println!("National holidays for {} are already present.", year);
            } else {
                println!("Added {} holiday(s) for {}:", added.len(), year);
                for holiday in added {
                    println!("  {}  {}", holiday.day().format("%m-%d"), holiday.name);
                }
            }
        }

        HolidayCommands::Check { date } => {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                PlannerError::Validation(format!("Invalid date '{}': {}", date, e))
            })?;
            let holidays = service.occurring_on(date)?;

            if holidays.is_empty() {
                println!("{}: no holiday, classes run normally.", date);
                return Ok(());
            }

            for holiday in &holidays {
                let blocking = if holiday.blocks_classes { "no classes" } else { "classes run" };
                println!("{}: {} ({}, {})", date, holiday.name, holiday.kind, blocking);
            }
        }

        HolidayCommands::List => {
            let mut holidays = storage.holidays.get_all()?;
            holidays.sort_by_key(|h| h.date);

            if holidays.is_empty() {
                println!("No holidays registered.");
                println!("Add the national calendar with: medplanner holiday seed");
                return Ok(());
            }

            for holiday in holidays {
                let recurring = if holiday.recurring { " [yearly]" } else { "" };
                println!("  {}  {}{}", holiday.day(), holiday.name, recurring);
            }
        }
    }

    Ok(())
}
