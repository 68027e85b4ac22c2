//! Backup and restore for MedPlanner
//!
//! A backup is a single JSON document holding every record of every entity
//! type, with relationships flattened to foreign-key ids.
//!
//! # Architecture
//!
//! - `dto`: the document schema ([`BackupBundle`] and one record type per entity)
//! - `snapshot`: builds a bundle from the live store
//! - `codec`: bundle to bytes and back, upgrading older documents on the way in
//! - `migrate`: format versions and the upgrade steps between them
//! - `restore`: destructive, all-or-nothing replacement of the store
//! - `manager`: file-level export/import plus rolling backups with retention
//!
//! # Retention Policy
//!
//! By default, the system keeps:
//! - 30 daily backups
//! - 12 monthly backups (first backup of each month)
//!
//! # Example
//!
//! ```rust,ignore
//! use medplanner::backup::{codec, restore, build_snapshot};
//!
//! let bundle = build_snapshot(&storage)?;
//! let bytes = codec::encode(&bundle)?;
//!
//! // Later, on another machine
//! let bundle = codec::decode(&bytes)?;
//! let summary = restore(&bundle, &other_storage)?;
//! println!("{}", summary.summary());
//! ```

pub mod codec;
pub mod dto;
pub mod migrate;
mod manager;
mod restore;
mod snapshot;

pub use dto::{BackupBundle, IntegrityReport, BACKUP_FORMAT_VERSION};
pub use manager::{
    default_export_filename, BackupInfo, BackupInspection, BackupManager, ExportReport,
    ImportReport,
};
pub use migrate::FormatVersion;
pub use restore::{restore, RestoreSummary};
pub use snapshot::{build_snapshot, build_snapshot_at};
