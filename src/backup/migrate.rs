//! Backup format versions and document upgrades
//!
//! Upgrades run on the raw JSON document before it is bound to
//! [`BackupBundle`](super::BackupBundle), so older files only have to be
//! reshaped, never re-read field by field.

use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{PlannerError, PlannerResult};

use super::dto::BACKUP_FORMAT_VERSION;

/// Version assumed for documents written before the field existed
pub const LEGACY_VERSION: &str = "1.0";

/// A `major.minor` backup format version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl FormatVersion {
    /// The version this release writes
    pub fn current() -> Self {
        // The constant is a literal that always parses.
        Self::parse(BACKUP_FORMAT_VERSION).unwrap_or(Self { major: 1, minor: 3 })
    }

    /// Parse `"1.3"`; patch components such as `"1.3.6"` are ignored
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(minor) => minor.parse().ok()?,
            None => 0,
        };
        Some(Self { major, minor })
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

type Step = fn(&mut Map<String, Value>);

/// Upgrade steps indexed by the minor version they start from
const STEPS: &[(u32, Step)] = &[(0, add_semesters)];

// 1.0 files predate semesters.
fn add_semesters(doc: &mut Map<String, Value>) {
    doc.entry("semestres")
        .or_insert_with(|| Value::Array(Vec::new()));
}

/// Bring a backup document up to the current format in place
///
/// Returns the version the document declared. A missing `version` is read
/// as 1.0. Another major version is rejected; a newer minor version is
/// accepted with a warning and unknown fields are ignored.
pub fn upgrade(document: &mut Value) -> PlannerResult<FormatVersion> {
    let doc = document.as_object_mut().ok_or_else(|| {
        PlannerError::MalformedBackup("backup document is not a JSON object".into())
    })?;

    let declared = match doc.get("version") {
        None => LEGACY_VERSION.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => {
            return Err(PlannerError::MalformedBackup(format!(
                "version must be a string, found {}",
                other
            )))
        }
    };

    let version = FormatVersion::parse(&declared).ok_or_else(|| {
        PlannerError::MalformedBackup(format!("unrecognized version {:?}", declared))
    })?;

    let current = FormatVersion::current();
    if version.major != current.major {
        return Err(PlannerError::MalformedBackup(format!(
            "unsupported backup version {} (this release reads {}.x)",
            declared, current.major
        )));
    }
    if version.minor > current.minor {
        warn!(
            version = %declared,
            supported = %current,
            "Backup was written by a newer release, unknown fields will be ignored"
        );
    }

    for (from, step) in STEPS.iter().filter(|(from, _)| *from >= version.minor) {
        let from = FormatVersion {
            major: current.major,
            minor: *from,
        };
        debug!(from = %from, "Upgrading backup document");
        step(doc);
    }

    doc.entry("version")
        .or_insert_with(|| Value::String(declared.clone()));

    Ok(version)
}
