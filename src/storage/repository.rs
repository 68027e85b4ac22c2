//! Generic JSON-file repository
//!
//! Every entity type is persisted the same way: an in-memory map keyed by the
//! entity's id, loaded from and saved to one JSON file.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::PlannerError;
use crate::models::{
    Absence, AbsenceId, Discipline, DisciplineId, Evaluation, EvaluationId, Exam, ExamId, Holiday,
    HolidayId, Note, NoteId, Professor, ProfessorId, Semester, SemesterId, Task, TaskId,
};

use super::file_io::{read_json, stage_json};

/// An entity that can be stored in a [`Repository`]
pub trait Record: Clone + Serialize + DeserializeOwned {
    type Id: Copy + Eq + Hash + Ord + Display;

    /// Entity name used in error messages and audit entries
    const ENTITY: &'static str;

    fn id(&self) -> Self::Id;
}

macro_rules! impl_record {
    ($model:ty, $id:ty, $entity:literal) => {
        impl Record for $model {
            type Id = $id;
            const ENTITY: &'static str = $entity;

            fn id(&self) -> $id {
                self.id
            }
        }
    };
}

impl_record!(Semester, SemesterId, "Semester");
impl_record!(Discipline, DisciplineId, "Discipline");
impl_record!(Task, TaskId, "Task");
impl_record!(Exam, ExamId, "Exam");
impl_record!(Absence, AbsenceId, "Absence");
impl_record!(Note, NoteId, "Note");
impl_record!(Evaluation, EvaluationId, "Evaluation");
impl_record!(Professor, ProfessorId, "Professor");
impl_record!(Holiday, HolidayId, "Holiday");

/// On-disk layout of a repository file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct RecordFile<T> {
    items: Vec<T>,
}

impl<T> Default for RecordFile<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

/// Repository for one entity type
pub struct Repository<T: Record> {
    path: PathBuf,
    data: RwLock<HashMap<T::Id, T>>,
}

impl<T: Record> Repository<T> {
    /// Create a new, empty repository backed by `path`
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Path of the backing JSON file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<T::Id, T>>, PlannerError> {
        self.data
            .read()
            .map_err(|e| PlannerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<T::Id, T>>, PlannerError> {
        self.data
            .write()
            .map_err(|e| PlannerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load records from disk, replacing anything in memory
    pub fn load(&self) -> Result<(), PlannerError> {
        let file_data: RecordFile<T> = read_json(&self.path)?;

        let mut data = self.write()?;
        data.clear();
        for record in file_data.items {
            data.insert(record.id(), record);
        }

        Ok(())
    }

    /// Write the current records to the staging file; see [`super::file_io::stage_json`]
    pub fn stage(&self) -> Result<PathBuf, PlannerError> {
        let file_data = RecordFile {
            items: self.get_all()?,
        };
        stage_json(&self.path, &file_data)
    }

    /// Save records to disk atomically
    pub fn save(&self) -> Result<(), PlannerError> {
        let temp_path = self.stage()?;
        super::file_io::commit_staged(&temp_path, &self.path)
    }

    /// Get a record by ID
    pub fn get(&self, id: T::Id) -> Result<Option<T>, PlannerError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// Get all records, ordered by id so output is stable
    pub fn get_all(&self) -> Result<Vec<T>, PlannerError> {
        let data = self.read()?;
        let mut records: Vec<T> = data.values().cloned().collect();
        records.sort_by_key(|r| r.id());
        Ok(records)
    }

    /// Get all records matching a predicate
    pub fn filter<F>(&self, predicate: F) -> Result<Vec<T>, PlannerError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| predicate(r))
            .collect())
    }

    /// Insert a new record, rejecting an id that is already present
    pub fn insert(&self, record: T) -> Result<(), PlannerError> {
        let mut data = self.write()?;
        let id = record.id();
        if data.contains_key(&id) {
            return Err(PlannerError::Duplicate {
                entity_type: T::ENTITY,
                identifier: id.to_string(),
            });
        }
        data.insert(id, record);
        Ok(())
    }

    /// Delete a record, returning it if it existed
    pub fn delete(&self, id: T::Id) -> Result<Option<T>, PlannerError> {
        Ok(self.write()?.remove(&id))
    }

    /// Delete every record matching a predicate, returning the removed records
    pub fn delete_where<F>(&self, predicate: F) -> Result<Vec<T>, PlannerError>
    where
        F: Fn(&T) -> bool,
    {
        let mut data = self.write()?;
        let doomed: Vec<T::Id> = data
            .values()
            .filter(|r| predicate(r))
            .map(|r| r.id())
            .collect();
        Ok(doomed.into_iter().filter_map(|id| data.remove(&id)).collect())
    }

    /// Apply `update` to every record, returning how many were changed
    pub fn update_all<F>(&self, update: F) -> Result<usize, PlannerError>
    where
        F: Fn(&mut T) -> bool,
    {
        let mut data = self.write()?;
        Ok(data.values_mut().filter_map(|r| update(r).then_some(())).count())
    }

    /// Remove every record
    pub fn clear(&self) -> Result<(), PlannerError> {
        self.write()?.clear();
        Ok(())
    }

    /// Check if a record exists
    pub fn exists(&self, id: T::Id) -> Result<bool, PlannerError> {
        Ok(self.read()?.contains_key(&id))
    }

    /// Count records
    pub fn count(&self) -> Result<usize, PlannerError> {
        Ok(self.read()?.len())
    }

    /// Copy of the in-memory state, used for transaction rollback
    pub(crate) fn snapshot(&self) -> Result<HashMap<T::Id, T>, PlannerError> {
        Ok(self.read()?.clone())
    }

    /// Replace the in-memory state with an earlier snapshot
    pub(crate) fn rollback(&self, snapshot: HashMap<T::Id, T>) -> Result<(), PlannerError> {
        *self.write()? = snapshot;
        Ok(())
    }
}
