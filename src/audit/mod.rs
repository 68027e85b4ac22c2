//! Audit logging system for MedPlanner
//!
//! Records deletes and every database-wide operation (export, import,
//! automatic backup) in an append-only JSONL log.
//!
//! # Example
//!
//! ```rust,ignore
//! use medplanner::audit::{AuditEntry, AuditLogger, Operation};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log_batch(&[AuditEntry::database(Operation::Export, "backup.json", "12 records")])?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
