//! Parquet-file backend: one file per control period.

use super::{batch_to_records, check_header, records_to_batch, table_schema, TableStorage};
use crate::record::Record;
use crate::{Error, Result};
use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use ::parquet::arrow::ArrowWriter;
use ::parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Storage backend writing period tables as Parquet files.
///
/// Saves go through a sibling temporary file that is renamed over the target,
/// so a failed write (disk full, target held open elsewhere) never leaves a
/// half-written table behind. Output contains no timestamps: saving the same
/// records twice produces identical bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParquetTableStorage {
    _private: (),
}

impl ParquetTableStorage {
    /// Create a new Parquet backend
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    fn temp_path(path: &Path) -> Result<PathBuf> {
        let name = path
            .file_name()
            .ok_or_else(|| Error::storage(path, "path has no file name"))?;
        Ok(path.with_file_name(format!(".{}.tmp", name.to_string_lossy())))
    }

    fn write_table(target: &Path, tmp: &Path, records: &[Record]) -> Result<()> {
        let file = File::create(tmp)
            .map_err(|e| Error::storage(target, format!("Failed to create table file: {e}")))?;

        let props = WriterProperties::builder().build();
        let mut writer = ArrowWriter::try_new(file, table_schema(), Some(props))
            .map_err(|e| Error::storage(target, format!("Failed to start Parquet writer: {e}")))?;

        if !records.is_empty() {
            let batch = records_to_batch(target, records)?;
            writer
                .write(&batch)
                .map_err(|e| Error::storage(target, format!("Failed to write rows: {e}")))?;
        }

        let file = writer
            .into_inner()
            .map_err(|e| Error::storage(target, format!("Failed to finish Parquet file: {e}")))?;
        file.sync_all()
            .map_err(|e| Error::storage(target, format!("Failed to sync table file: {e}")))?;
        Ok(())
    }
}

impl TableStorage for ParquetTableStorage {
    fn create_if_missing(&self, path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::storage(path, format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }
        self.save(path, &[])?;
        info!(path = %path.display(), "created header-only period table");
        Ok(true)
    }

    fn load(&self, path: &Path) -> Result<Vec<Record>> {
        let file = File::open(path)
            .map_err(|e| Error::storage(path, format!("Failed to open Parquet file: {e}")))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .map_err(|e| Error::storage(path, format!("Failed to parse Parquet file: {e}")))?;

        // Checked up front so a header-only table with a wrong header is still rejected
        check_header(path, builder.schema())?;

        let reader = builder
            .build()
            .map_err(|e| Error::storage(path, format!("Failed to create Parquet reader: {e}")))?;

        let mut records = Vec::new();
        for batch in reader {
            let batch = batch
                .map_err(|e| Error::storage(path, format!("Failed to read record batch: {e}")))?;
            records.extend(batch_to_records(path, &batch)?);
        }

        debug!(path = %path.display(), records = records.len(), "loaded period table");
        Ok(records)
    }

    fn save(&self, path: &Path, records: &[Record]) -> Result<()> {
        let tmp = Self::temp_path(path)?;
        let result = Self::write_table(path, &tmp, records).and_then(|()| {
            fs::rename(&tmp, path)
                .map_err(|e| Error::storage(path, format!("Failed to replace table file: {e}")))
        });

        match result {
            Ok(()) => {
                info!(path = %path.display(), records = records.len(), "saved period table");
                Ok(())
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "period table not saved");
                if let Err(e) = fs::remove_file(&tmp) {
                    debug!(tmp = %tmp.display(), error = %e, "no temporary file to clean up");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Session;

    #[test]
    fn test_create_if_missing_writes_header_only_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("controle-03-24.parquet");
        let storage = ParquetTableStorage::new();

        assert!(storage.create_if_missing(&path).unwrap());
        assert!(!storage.create_if_missing(&path).unwrap());
        assert!(storage.load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_or_create_then_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("controle-03-24.parquet");
        let storage = ParquetTableStorage::new();

        assert!(storage.load_or_create(&path).unwrap().is_empty());

        let records = vec![
            Record::new("A", 5, 9).with(Session::Matin, 12.5).with(Session::Soir, 13.0),
            Record::new("A", 6, 9).with(Session::Midi, 11.0),
        ];
        storage.save(&path, &records).unwrap();
        assert_eq!(storage.load_or_create(&path).unwrap(), records);
    }

    #[test]
    fn test_save_is_full_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.parquet");
        let storage = ParquetTableStorage::new();

        storage.save(&path, &[Record::new("A", 1, 2), Record::new("A", 3, 4)]).unwrap();
        storage.save(&path, &[Record::new("B", 5, 6)]).unwrap();
        assert_eq!(storage.load(&path).unwrap(), vec![Record::new("B", 5, 6)]);
    }

    #[test]
    fn test_save_failure_is_storage_access_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the target path cannot be replaced by a file
        let path = dir.path().join("busy.parquet");
        fs::create_dir(&path).unwrap();
        let storage = ParquetTableStorage::new();

        let err = storage.save(&path, &[Record::new("A", 1, 2)]).unwrap_err();
        assert!(err.is_retryable());
        assert!(!dir.path().join(".busy.parquet.tmp").exists());
    }

    #[test]
    fn test_load_garbage_is_storage_access() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.parquet");
        fs::write(&path, b"LOT,SNIT,NORMAL\n").unwrap();

        let err = ParquetTableStorage::new().load(&path).unwrap_err();
        assert!(matches!(err, Error::StorageAccess { .. }));
    }
}
