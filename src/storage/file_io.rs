//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure. Writes
//! can also be split into a staging step and a commit step so that several
//! files are fully written before any of them replaces its predecessor.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::PlannerError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, PlannerError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| PlannerError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| PlannerError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Temp file used while staging a write to `path`
pub fn staging_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

/// Serialize `data` into the staging file next to `path` and sync it
///
/// The target file is left untouched until [`commit_staged`] is called.
pub fn stage_json<T, P>(path: P, data: &T) -> Result<PathBuf, PlannerError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            PlannerError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = staging_path(path);

    let file = File::create(&temp_path)
        .map_err(|e| PlannerError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| PlannerError::Storage(format!("Failed to serialize data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| PlannerError::Storage(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| PlannerError::Storage(format!("Failed to sync data: {}", e)))?;

    Ok(temp_path)
}

/// Move a staged file over its target
pub fn commit_staged<P: AsRef<Path>>(temp_path: &Path, path: P) -> Result<(), PlannerError> {
    fs::rename(temp_path, path.as_ref()).map_err(|e| {
        let _ = fs::remove_file(temp_path);
        PlannerError::Storage(format!("Failed to rename temp file: {}", e))
    })
}

/// Remove a staged file that will not be committed
pub fn discard_staged(temp_path: &Path) {
    let _ = fs::remove_file(temp_path);
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), PlannerError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let temp_path = stage_json(&path, data)?;
    commit_staged(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn sample() -> TestData {
        TestData {
            name: "test".to_string(),
            value: 42,
        }
    }

    #[test]
    fn test_read_nonexistent_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let data: TestData = read_json(&path).unwrap();
        assert_eq!(data, TestData::default());
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");

        write_json_atomic(&path, &sample()).unwrap();
        assert!(path.exists());
        assert!(!staging_path(&path).exists());

        let loaded: TestData = read_json(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_staged_write_leaves_target_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");
        write_json_atomic(&path, &TestData::default()).unwrap();

        let staged = stage_json(&path, &sample()).unwrap();
        let before: TestData = read_json(&path).unwrap();
        assert_eq!(before, TestData::default());

        commit_staged(&staged, &path).unwrap();
        let after: TestData = read_json(&path).unwrap();
        assert_eq!(after, sample());
    }

    #[test]
    fn test_discard_staged() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("test.json");

        let staged = stage_json(&path, &sample()).unwrap();
        discard_staged(&staged);

        assert!(!staged.exists());
        assert!(!path.exists());
    }

    #[test]
    fn test_read_invalid_json_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "not json at all").unwrap();

        let result: Result<TestData, _> = read_json(&path);
        assert!(result.is_err());
    }
}
