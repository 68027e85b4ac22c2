//! Custom error types for MedPlanner
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for MedPlanner operations
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing a user-chosen file failed
    #[error("File I/O error: {0}")]
    FileIo(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// A backup document could not be parsed or lacks a required field
    #[error("Malformed backup: {0}")]
    MalformedBackup(String),

    /// The persistence layer rejected a write during a restore
    #[error("Store write failure: {0}")]
    StoreWriteFailure(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PlannerError {
    /// Create a "not found" error for semesters
    pub fn semester_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Semester",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for disciplines
    pub fn discipline_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Discipline",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if the input backup was unusable
    pub fn is_malformed_backup(&self) -> bool {
        matches!(self, Self::MalformedBackup(_))
    }

    /// Check if the store refused a restore write
    pub fn is_store_write_failure(&self) -> bool {
        matches!(self, Self::StoreWriteFailure(_))
    }
}

impl From<std::io::Error> for PlannerError {
    fn from(err: std::io::Error) -> Self {
        Self::FileIo(err.to_string())
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for MedPlanner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
