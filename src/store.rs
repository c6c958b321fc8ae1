//! Record Store - the in-memory working set of one open control period
//!
//! Records keep their insertion order, which is also the row order written
//! back to the period table. The store never holds two records with the same
//! lot and unordered identifier pair.

use crate::error::ValidationError;
use crate::matcher;
use crate::record::Record;
use crate::Result;

/// Ordered, exclusively owned collection of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap records loaded from a table, keeping their order as-is.
    ///
    /// Tables written by this crate never contain duplicate keys; if a
    /// hand-edited table does, lookups resolve to the first occurrence.
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Find the record for `lot` and `{id_a, id_b}` in either order.
    #[must_use]
    pub fn find(&self, lot: &str, id_a: i64, id_b: i64) -> Option<&Record> {
        matcher::find_record(&self.records, lot, id_a, id_b)
    }

    /// Append a record at the end.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateKey`] if a record with the same key exists
    pub fn append(&mut self, record: Record) -> Result<()> {
        if self.find(record.lot(), record.id_a(), record.id_b()).is_some() {
            return Err(ValidationError::DuplicateKey {
                lot: record.lot().to_string(),
                id_a: record.id_a(),
                id_b: record.id_b(),
            }
            .into());
        }
        self.records.push(record);
        Ok(())
    }

    /// Append without the duplicate check; the caller has just run the matcher.
    pub(crate) fn push_unchecked(&mut self, record: Record) {
        self.records.push(record);
    }

    pub(crate) fn find_mut(&mut self, lot: &str, id_a: i64, id_b: i64) -> Option<&mut Record> {
        matcher::find(&self.records, lot, id_a, id_b).map(|idx| &mut self.records[idx])
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
