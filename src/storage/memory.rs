//! In-memory table backend using `DashMap`.
//!
//! Data is lost on process restart. Paths can be locked to simulate a table
//! held open by another program.

use super::TableStorage;
use crate::record::Record;
use crate::{Error, Result};
use dashmap::{DashMap, DashSet};
use std::path::{Path, PathBuf};

/// In-memory period tables keyed by path.
///
/// # Example
///
/// ```rust
/// use seigla_controle::storage::{MemoryTableStorage, TableStorage};
/// use std::path::Path;
///
/// # fn main() -> seigla_controle::Result<()> {
/// let storage = MemoryTableStorage::new();
/// let path = Path::new("controle-03-24.parquet");
/// assert!(storage.load_or_create(path)?.is_empty());
///
/// storage.lock(path);
/// assert!(storage.save(path, &[]).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryTableStorage {
    tables: DashMap<PathBuf, Vec<Record>>,
    locked: DashSet<PathBuf>,
}

impl MemoryTableStorage {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tables held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if no table exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Check if a table exists at `path`.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.tables.contains_key(path)
    }

    /// Make subsequent saves to `path` fail, as if the file were open elsewhere.
    pub fn lock(&self, path: &Path) {
        self.locked.insert(path.to_path_buf());
    }

    /// Undo [`MemoryTableStorage::lock`].
    pub fn unlock(&self, path: &Path) {
        self.locked.remove(path);
    }
}

impl TableStorage for MemoryTableStorage {
    fn create_if_missing(&self, path: &Path) -> Result<bool> {
        if self.tables.contains_key(path) {
            return Ok(false);
        }
        self.tables.insert(path.to_path_buf(), Vec::new());
        Ok(true)
    }

    fn load(&self, path: &Path) -> Result<Vec<Record>> {
        self.tables
            .get(path)
            .map(|t| t.value().clone())
            .ok_or_else(|| Error::storage(path, "no such table"))
    }

    fn save(&self, path: &Path, records: &[Record]) -> Result<()> {
        if self.locked.contains(path) {
            return Err(Error::storage(path, "table is locked by another program"));
        }
        self.tables.insert(path.to_path_buf(), records.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_table_fails() {
        let storage = MemoryTableStorage::new();
        assert!(storage.load(Path::new("nope")).is_err());
    }

    #[test]
    fn test_locked_save_keeps_previous_content() {
        let storage = MemoryTableStorage::new();
        let path = Path::new("p");
        storage.save(path, &[Record::new("A", 1, 2)]).unwrap();

        storage.lock(path);
        let err = storage.save(path, &[]).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(storage.load(path).unwrap().len(), 1);

        storage.unlock(path);
        storage.save(path, &[]).unwrap();
        assert!(storage.load(path).unwrap().is_empty());
    }

    #[test]
    fn test_len_and_contains() {
        let storage = MemoryTableStorage::new();
        assert!(storage.is_empty());
        storage.create_if_missing(Path::new("a")).unwrap();
        assert!(storage.contains(Path::new("a")));
        assert_eq!(storage.len(), 1);
    }
}
