//! CLI commands for moving data between devices
//!
//! `export` writes a backup document, `import` replaces the store from one,
//! and `inspect` reports on a document without touching the store.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::backup::{default_export_filename, BackupManager};
use crate::config::settings::Settings;
use crate::error::PlannerResult;
use crate::storage::Storage;

use super::backup::format_size;

/// Handle the export command
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    output: Option<PathBuf>,
    compact: bool,
) -> PlannerResult<()> {
    let manager = BackupManager::new(storage.paths(), settings.backup_retention.clone());
    let path = output.unwrap_or_else(|| PathBuf::from(default_export_filename(Local::now().date_naive())));
    let pretty = settings.pretty_export && !compact;

    let report = manager.export_data(storage, &path, pretty)?;

    println!("Exported to {}", report.path.display());
    println!("  {}", report.counts);
    println!("  Size: {}", format_size(report.size_bytes));
    Ok(())
}

/// Handle the import command
pub fn handle_import_command(
    storage: &Storage,
    settings: &Settings,
    path: &Path,
    force: bool,
) -> PlannerResult<()> {
    let manager = BackupManager::new(storage.paths(), settings.backup_retention.clone());
    let inspection = manager.inspect(path)?;

    println!("Backup from {}", inspection.export_date.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Format version: {}", inspection.version);
    println!("  Contents: {}", inspection.integrity.counts);
    if inspection.integrity.dangling_links > 0 {
        println!(
            "  {} link(s) point at missing records and will be cleared",
            inspection.integrity.dangling_links
        );
    }

    if !force {
        println!();
        println!("WARNING: Importing replaces ALL current data!");
        println!("To proceed, run again with --force flag:");
        println!("  medplanner import {} --force", path.display());
        return Ok(());
    }

    let report = manager.import_data(storage, path, settings.backup_before_import)?;
    if let Some(safety) = &report.safety_backup {
        println!("Previous data saved to {}", safety.display());
    }
    println!("{}", report.restore.summary());
    Ok(())
}

/// Handle the inspect command
pub fn handle_inspect_command(storage: &Storage, settings: &Settings, path: &Path) -> PlannerResult<()> {
    let manager = BackupManager::new(storage.paths(), settings.backup_retention.clone());
    let inspection = manager.inspect(path)?;
    let integrity = &inspection.integrity;

    println!("File: {}", path.display());
    println!("Format version: {}", inspection.version);
    println!("Exported: {}", inspection.export_date.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Contents: {}", integrity.counts);
    println!("Dangling links: {}", integrity.dangling_links);
    println!("Duplicate ids: {}", integrity.duplicate_ids);
    println!("Invalid records: {}", integrity.invalid_records);
    Ok(())
}
