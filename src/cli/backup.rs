//! Backup CLI commands
//!
//! Implements CLI commands for rolling backup management.

use clap::Subcommand;
use std::path::PathBuf;

use crate::backup::BackupManager;
use crate::config::paths::PlannerPaths;
use crate::config::settings::Settings;
use crate::error::{PlannerError, PlannerResult};
use crate::storage::Storage;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup
    Create,

    /// List all available backups
    List {
        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Restore from a backup
    Restore {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show information about a specific backup
    Info {
        /// Backup filename or path
        backup: String,
    },

    /// Delete old backups according to retention policy
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BackupCommands,
) -> PlannerResult<()> {
    let paths = storage.paths();
    let manager = BackupManager::new(paths, settings.backup_retention.clone());

    match cmd {
        BackupCommands::Create => {
            let (backup_path, deleted) = manager.create_backup_with_retention(storage)?;
            println!("Backup created: {}", file_label(&backup_path));
            println!("Location: {}", backup_path.display());
            if !deleted.is_empty() {
                println!("Pruned {} old backup(s).", deleted.len());
            }
        }

        BackupCommands::List { detailed } => {
            let backups = manager.list_backups()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: medplanner backup create");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            println!();

            for (i, backup) in backups.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(backup.created_at);
                let monthly_marker = if backup.is_monthly { " [monthly]" } else { "" };

                if detailed {
                    println!(
                        "{}. {}{}\n   Created: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        backup.filename,
                        monthly_marker,
                        backup.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(backup.size_bytes),
                        format_duration(age),
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {}){}",
                        i + 1,
                        backup.filename,
                        format_duration(age),
                        format_size(backup.size_bytes),
                        monthly_marker,
                    );
                }
            }

            println!();
            println!("Total: {} backup(s)", backups.len());
        }

        BackupCommands::Restore { backup, force } => {
            let backup_path = resolve_backup_path(&manager, paths, &backup)?;
            let inspection = manager.inspect(&backup_path)?;

            println!("Backup Information");
            println!("==================");
            println!("File: {}", backup_path.display());
            println!(
                "Exported: {}",
                inspection.export_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Format version: {}", inspection.version);
            println!("Contents: {}", inspection.integrity.counts);
            println!();

            if !force {
                println!("WARNING: This will replace ALL current data!");
                println!("To proceed, run again with --force flag:");
                println!("  medplanner backup restore {} --force", backup);
                return Ok(());
            }

            let report = manager.import_data(storage, &backup_path, settings.backup_before_import)?;
            if let Some(safety) = &report.safety_backup {
                println!("Pre-restore backup saved: {}", file_label(safety));
            }
            println!("Restore complete!");
            println!("{}", report.restore.summary());
        }

        BackupCommands::Info { backup } => {
            let backup_path = resolve_backup_path(&manager, paths, &backup)?;
            let inspection = manager.inspect(&backup_path)?;
            let metadata = std::fs::metadata(&backup_path)?;
            let counts = inspection.integrity.counts;

            println!("Backup Details");
            println!("==============");
            println!("File: {}", backup_path.display());
            println!("Size: {}", format_size(metadata.len()));
            println!(
                "Exported: {}",
                inspection.export_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Format version: {}", inspection.version);
            println!();
            println!("Contents:");
            println!("  Semesters:   {}", counts.semesters);
            println!("  Disciplines: {}", counts.disciplines);
            println!("  Tasks:       {}", counts.tasks);
            println!("  Exams:       {}", counts.exams);
            println!("  Absences:    {}", counts.absences);
            println!("  Notes:       {}", counts.notes);
            println!("  Evaluations: {}", counts.evaluations);
            println!("  Professors:  {}", counts.professors);
            println!("  Holidays:    {}", counts.holidays);
            println!();
            println!(
                "Status: {}",
                if inspection.integrity.is_clean() {
                    "Consistent".to_string()
                } else {
                    format!(
                        "{} dangling link(s), {} duplicate id(s), {} invalid record(s)",
                        inspection.integrity.dangling_links,
                        inspection.integrity.duplicate_ids,
                        inspection.integrity.invalid_records
                    )
                }
            );
        }

        BackupCommands::Prune { force } => {
            let backups = manager.list_backups()?;
            let retention = &settings.backup_retention;

            let (monthly, daily): (Vec<_>, Vec<_>) = backups.iter().partition(|b| b.is_monthly);

            let daily_to_delete = daily.len().saturating_sub(retention.daily_count as usize);
            let monthly_to_delete = monthly
                .len()
                .saturating_sub(retention.monthly_count as usize);
            let total_to_delete = daily_to_delete + monthly_to_delete;

            if total_to_delete == 0 {
                println!("No backups to prune.");
                println!(
                    "Current retention policy: {} daily, {} monthly",
                    retention.daily_count, retention.monthly_count
                );
                return Ok(());
            }

            println!(
                "To be deleted: {} daily, {} monthly ({} total)",
                daily_to_delete, monthly_to_delete, total_to_delete
            );

            if !force {
                println!("To delete old backups, run again with --force flag:");
                println!("  medplanner backup prune --force");
                return Ok(());
            }

            let deleted = manager.enforce_retention()?;
            println!("Deleted {} backup(s).", deleted.len());
        }
    }

    Ok(())
}

fn file_label(path: &std::path::Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Resolve a backup identifier to a full path
fn resolve_backup_path(
    manager: &BackupManager,
    paths: &PlannerPaths,
    backup: &str,
) -> PlannerResult<PathBuf> {
    if backup.eq_ignore_ascii_case("latest") {
        return manager
            .get_latest_backup()?
            .map(|b| b.path)
            .ok_or_else(|| PlannerError::NotFound {
                entity_type: "Backup",
                identifier: "latest".to_string(),
            });
    }

    let path = PathBuf::from(backup);
    if path.exists() {
        return Ok(path);
    }

    let backup_path = paths.backup_dir().join(backup);
    if backup_path.exists() {
        return Ok(backup_path);
    }

    let with_ext = paths.backup_dir().join(format!("{}.json", backup));
    if with_ext.exists() {
        return Ok(with_ext);
    }

    Err(PlannerError::NotFound {
        entity_type: "Backup",
        identifier: backup.to_string(),
    })
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
pub(crate) fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
