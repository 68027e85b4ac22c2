//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup and service layers.

pub mod backup;
pub mod holiday;
pub mod report;
pub mod transfer;

pub use backup::{handle_backup_command, BackupCommands};
pub use holiday::{handle_holiday_command, HolidayCommands};
pub use report::{handle_report_command, ReportCommands};
pub use transfer::{handle_export_command, handle_import_command, handle_inspect_command};
