//! MedPlanner - study planner for medical students
//!
//! This library provides the data core of the MedPlanner application: the
//! planner entities, their JSON file storage, and a backup format that moves
//! the whole database between devices.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (semesters, disciplines, exams, etc.)
//! - `storage`: JSON file storage layer with transactional bulk writes
//! - `audit`: Audit logging system
//! - `backup`: Backup documents, restore, and rolling backups
//! - `services`: Grade, attendance and holiday calculations
//! - `cli`: Command handlers for the `medplanner` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use medplanner::backup::{codec, build_snapshot, restore};
//! use medplanner::config::paths::PlannerPaths;
//! use medplanner::storage::Storage;
//!
//! let mut storage = Storage::new(PlannerPaths::new()?)?;
//! storage.load_all()?;
//!
//! let bytes = codec::encode(&build_snapshot(&storage)?)?;
//! let summary = restore(&codec::decode(&bytes)?, &storage)?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{PlannerError, PlannerResult};
