//! Tabular storage backend (Arrow/Parquet)
//!
//! A period table always has the fixed header
//! `LOT, SNIT, NORMAL, MATIN, MIDI, SOIR`. Writes are full rewrites, never appends:
//! the working set is small (one control period) and is flushed in one go.
//!
//! Two backends implement [`TableStorage`]:
//! - [`ParquetTableStorage`]: one Parquet file per period on disk
//! - [`MemoryTableStorage`]: `DashMap`-backed tables, for tests and headless use

mod memory;
mod parquet_file;

pub use self::memory::MemoryTableStorage;
pub use self::parquet_file::ParquetTableStorage;

use crate::record::{Record, Session, HEADER_ROW, KEY_COLUMNS};
use crate::{Error, Result};
use arrow::array::{
    Array, ArrayRef, AsArray, Float64Array, Int64Array, RecordBatch, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema, SchemaRef};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage contract consumed by the control period and the navigation flow.
pub trait TableStorage {
    /// Create a header-only table at `path` if none exists.
    ///
    /// Returns `true` when the table was created by this call.
    ///
    /// # Errors
    /// Returns [`Error::StorageAccess`] if the table cannot be created
    fn create_if_missing(&self, path: &Path) -> Result<bool>;

    /// Read every row of the table at `path`, in file order.
    ///
    /// # Errors
    /// Returns [`Error::StorageAccess`] if the table is missing or unreadable,
    /// [`Error::Schema`] if its header does not match the fixed schema
    fn load(&self, path: &Path) -> Result<Vec<Record>>;

    /// Replace the table at `path` with the header followed by `records`.
    ///
    /// On failure the previous table content is left untouched.
    ///
    /// # Errors
    /// Returns [`Error::StorageAccess`] if the table cannot be written
    fn save(&self, path: &Path, records: &[Record]) -> Result<()>;

    /// Load the table at `path`, creating a header-only one first if absent.
    ///
    /// # Errors
    /// See [`TableStorage::create_if_missing`] and [`TableStorage::load`]
    fn load_or_create(&self, path: &Path) -> Result<Vec<Record>> {
        if self.create_if_missing(path)? {
            return Ok(Vec::new());
        }
        self.load(path)
    }
}

/// Arrow schema of a period table.
#[must_use]
pub fn table_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(HEADER_ROW[0], DataType::Utf8, false),
        Field::new(HEADER_ROW[1], DataType::Int64, false),
        Field::new(HEADER_ROW[2], DataType::Int64, false),
        Field::new(HEADER_ROW[3], DataType::Float64, true),
        Field::new(HEADER_ROW[4], DataType::Float64, true),
        Field::new(HEADER_ROW[5], DataType::Float64, true),
    ]))
}

/// Convert records to a single batch in header order.
///
/// # Errors
/// Returns [`Error::StorageAccess`] if Arrow rejects the batch
pub fn records_to_batch(path: &Path, records: &[Record]) -> Result<RecordBatch> {
    let lot = StringArray::from_iter_values(records.iter().map(Record::lot));
    let snit = Int64Array::from_iter_values(records.iter().map(Record::id_a));
    let normal = Int64Array::from_iter_values(records.iter().map(Record::id_b));

    let mut columns: Vec<ArrayRef> = vec![Arc::new(lot), Arc::new(snit), Arc::new(normal)];
    for session in Session::ALL {
        let values: Float64Array = records.iter().map(|r| r.value(session)).collect();
        columns.push(Arc::new(values));
    }

    RecordBatch::try_new(table_schema(), columns)
        .map_err(|e| Error::storage(path, format!("Failed to build record batch: {e}")))
}

/// Reject any header that is not a prefix of [`HEADER_ROW`] covering at least the
/// key columns, or whose column types cannot hold the expected values.
///
/// # Errors
/// Returns [`Error::Schema`] describing the columns found
pub fn check_header(path: &Path, schema: &Schema) -> Result<()> {
    let fields = schema.fields();
    let names_ok = fields.len() >= KEY_COLUMNS
        && fields.len() <= HEADER_ROW.len()
        && fields.iter().zip(HEADER_ROW).all(|(f, h)| f.name() == h);
    if !names_ok {
        let found = fields.iter().map(|f| f.name().clone()).collect();
        warn!(path = %path.display(), ?found, "table header does not match schema");
        return Err(Error::Schema {
            path: path.to_path_buf(),
            found,
        });
    }

    let types_ok = fields.iter().enumerate().all(|(idx, f)| {
        let dt = f.data_type();
        match idx {
            0 => matches!(dt, DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View),
            1 | 2 => dt.is_integer(),
            _ => dt.is_numeric() || *dt == DataType::Null,
        }
    });
    if !types_ok {
        let found = fields
            .iter()
            .map(|f| format!("{}: {}", f.name(), f.data_type()))
            .collect();
        warn!(path = %path.display(), ?found, "table column types do not match schema");
        return Err(Error::Schema {
            path: path.to_path_buf(),
            found,
        });
    }
    Ok(())
}

/// Convert one batch back to records. Missing trailing session columns load as absent.
///
/// # Errors
/// Returns [`Error::Schema`] on header mismatch and [`Error::StorageAccess`] on a
/// null key cell
pub fn batch_to_records(path: &Path, batch: &RecordBatch) -> Result<Vec<Record>> {
    check_header(path, &batch.schema())?;

    let lot_col = cast_column(path, batch, 0, &DataType::Utf8)?;
    let lots = lot_col
        .as_string_opt::<i32>()
        .ok_or_else(|| schema_error(path, batch, 0))?;
    let snit_col = cast_column(path, batch, 1, &DataType::Int64)?;
    let snits = snit_col
        .as_primitive_opt::<Int64Type>()
        .ok_or_else(|| schema_error(path, batch, 1))?;
    let normal_col = cast_column(path, batch, 2, &DataType::Int64)?;
    let normals = normal_col
        .as_primitive_opt::<Int64Type>()
        .ok_or_else(|| schema_error(path, batch, 2))?;

    let mut session_cols = Vec::with_capacity(Session::ALL.len());
    for (offset, session) in Session::ALL.into_iter().enumerate() {
        let idx = KEY_COLUMNS + offset;
        if idx < batch.num_columns() {
            session_cols.push((session, Some(cast_column(path, batch, idx, &DataType::Float64)?)));
        } else {
            session_cols.push((session, None));
        }
    }

    let mut records = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        for (idx, col) in [(0, &lot_col), (1, &snit_col), (2, &normal_col)] {
            if col.is_null(row) {
                return Err(Error::storage(
                    path,
                    format!("corrupt table: null {} at row {}", HEADER_ROW[idx], row + 1),
                ));
            }
        }

        let mut record = Record::new(lots.value(row), snits.value(row), normals.value(row));
        for (session, col) in &session_cols {
            let value = match col {
                Some(col) => {
                    let values = col
                        .as_primitive_opt::<Float64Type>()
                        .ok_or_else(|| schema_error(path, batch, KEY_COLUMNS))?;
                    values.is_valid(row).then(|| values.value(row))
                }
                None => None,
            };
            record.set_optional(*session, value);
        }
        records.push(record);
    }

    debug!(path = %path.display(), rows = records.len(), "decoded record batch");
    Ok(records)
}

fn cast_column(path: &Path, batch: &RecordBatch, idx: usize, to: &DataType) -> Result<ArrayRef> {
    cast(batch.column(idx), to).map_err(|e| {
        warn!(path = %path.display(), column = HEADER_ROW[idx], error = %e, "column cast failed");
        schema_error(path, batch, idx)
    })
}

fn schema_error(path: &Path, batch: &RecordBatch, idx: usize) -> Error {
    let field = batch.schema_ref().field(idx).clone();
    Error::Schema {
        path: path.to_path_buf(),
        found: vec![format!("{}: {}", field.name(), field.data_type())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![
            Record::new("A", 5, 9).with(Session::Matin, 12.5).with(Session::Soir, 13.0),
            Record::new("B", 6, 9).with(Session::Midi, 11.0),
        ]
    }

    #[test]
    fn test_batch_follows_header() {
        let batch = records_to_batch(Path::new("t"), &sample()).unwrap();
        let names: Vec<_> = batch.schema().fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(names, HEADER_ROW);
        assert_eq!(batch.num_rows(), 2);
        // absent readings are nulls, not zeros
        assert_eq!(batch.column(4).null_count(), 1);
    }

    #[test]
    fn test_batch_round_trip() {
        let records = sample();
        let batch = records_to_batch(Path::new("t"), &records).unwrap();
        assert_eq!(batch_to_records(Path::new("t"), &batch).unwrap(), records);
    }

    #[test]
    fn test_missing_session_columns_default_to_absent() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("LOT", DataType::Utf8, false),
            Field::new("SNIT", DataType::Int32, false),
            Field::new("NORMAL", DataType::Int32, false),
            Field::new("MATIN", DataType::Float32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["A"])),
                Arc::new(arrow::array::Int32Array::from(vec![5])),
                Arc::new(arrow::array::Int32Array::from(vec![9])),
                Arc::new(arrow::array::Float32Array::from(vec![Some(12.5)])),
            ],
        )
        .unwrap();

        let records = batch_to_records(Path::new("t"), &batch).unwrap();
        assert_eq!(records, vec![Record::new("A", 5, 9).with(Session::Matin, 12.5)]);
    }

    #[test]
    fn test_header_mismatch_rejected() {
        let schema = Schema::new(vec![
            Field::new("LOT", DataType::Utf8, false),
            Field::new("NORMAL", DataType::Int64, false),
            Field::new("SNIT", DataType::Int64, false),
        ]);
        let err = check_header(Path::new("t"), &schema).unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_float_identifier_rejected() {
        let schema = Schema::new(vec![
            Field::new("LOT", DataType::Utf8, false),
            Field::new("SNIT", DataType::Float64, false),
            Field::new("NORMAL", DataType::Int64, false),
        ]);
        let err = check_header(Path::new("t"), &schema).unwrap_err();
        assert!(err.to_string().contains("SNIT: Float64"));
    }

    #[test]
    fn test_null_key_is_corrupt() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("LOT", DataType::Utf8, true),
            Field::new("SNIT", DataType::Int64, true),
            Field::new("NORMAL", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![Some("A")])),
                Arc::new(Int64Array::from(vec![None::<i64>])),
                Arc::new(Int64Array::from(vec![Some(9)])),
            ],
        )
        .unwrap();

        let err = batch_to_records(Path::new("t"), &batch).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::StorageAccess);
        assert!(err.to_string().contains("null SNIT at row 1"));
    }
}
