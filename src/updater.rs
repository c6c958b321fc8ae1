//! Session Updater - applies one operator entry to a record store
//!
//! An entry is four text fields (LOT, SNIT, NORMAL and the reading "PL").
//! It either updates the session reading of the matching record or appends
//! a new record. Nothing is written to disk here; the period is flushed
//! explicitly once the operator finishes the session.

use crate::error::ValidationError;
use crate::record::{Record, Session};
use crate::store::RecordStore;
use crate::Result;
use std::fmt;
use tracing::{debug, warn};

/// Result of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// An existing record was updated; identifiers as stored in that record
    Updated {
        /// Stored SNIT
        id_a: i64,
        /// Stored NORMAL
        id_b: i64,
    },
    /// A new record was appended; identifiers as entered
    Inserted {
        /// Entered SNIT
        id_a: i64,
        /// Entered NORMAL
        id_b: i64,
    },
}

impl Outcome {
    /// Operator feedback line.
    #[must_use]
    pub fn status_message(&self) -> String {
        match self {
            Self::Updated { id_a, id_b } => format!("Mise à jour vache {id_a}/{id_b}"),
            Self::Inserted { id_a, id_b } => format!("Ajouté vache {id_a}/{id_b}"),
        }
    }

    /// Whether a new record was created.
    #[must_use]
    pub const fn is_insert(&self) -> bool {
        matches!(self, Self::Inserted { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status_message())
    }
}

/// A parsed, validated entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Lot, trimmed
    pub lot: String,
    /// SNIT
    pub id_a: i64,
    /// NORMAL
    pub id_b: i64,
    /// Reading
    pub value: f64,
}

impl Entry {
    /// Validate raw operator text.
    ///
    /// Every field is trimmed; the reading accepts a decimal comma.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingField`] if any field is empty,
    /// [`ValidationError::NonNumeric`] if SNIT/NORMAL are not integers or the
    /// reading is not a finite number
    pub fn parse(
        lot: &str,
        id_a_text: &str,
        id_b_text: &str,
        value_text: &str,
    ) -> std::result::Result<Self, ValidationError> {
        let fields = [
            ("LOT", lot.trim()),
            ("SNIT", id_a_text.trim()),
            ("NORMAL", id_b_text.trim()),
            ("PL", value_text.trim()),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, text)| text.is_empty()) {
            return Err(ValidationError::MissingField(*name));
        }
        let [(_, lot), (_, id_a), (_, id_b), (_, value)] = fields;

        let id_a = parse_id("SNIT", id_a)?;
        let id_b = parse_id("NORMAL", id_b)?;
        let value = value
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| non_numeric("PL", value))?;

        Ok(Self {
            lot: lot.to_string(),
            id_a,
            id_b,
            value,
        })
    }
}

fn parse_id(field: &'static str, text: &str) -> std::result::Result<i64, ValidationError> {
    text.parse().map_err(|_| non_numeric(field, text))
}

fn non_numeric(field: &'static str, text: &str) -> ValidationError {
    ValidationError::NonNumeric {
        field,
        value: text.to_string(),
    }
}

/// Validate one entry and merge it into `store`.
///
/// # Errors
///
/// Returns [`crate::Error::Validation`] on missing or non-numeric input; the
/// store is left untouched in that case.
pub fn submit(
    store: &mut RecordStore,
    session: Session,
    lot: &str,
    id_a_text: &str,
    id_b_text: &str,
    value_text: &str,
) -> Result<Outcome> {
    let entry = Entry::parse(lot, id_a_text, id_b_text, value_text).map_err(|e| {
        warn!(%session, error = %e, "entry rejected");
        e
    })?;
    Ok(apply(store, session, entry))
}

/// Merge an already validated entry into `store`.
pub fn apply(store: &mut RecordStore, session: Session, entry: Entry) -> Outcome {
    if let Some(record) = store.find_mut(&entry.lot, entry.id_a, entry.id_b) {
        record.set(session, entry.value);
        let outcome = Outcome::Updated {
            id_a: record.id_a(),
            id_b: record.id_b(),
        };
        debug!(lot = %entry.lot, %session, value = entry.value, ?outcome, "updated record");
        return outcome;
    }

    let outcome = Outcome::Inserted {
        id_a: entry.id_a,
        id_b: entry.id_b,
    };
    debug!(lot = %entry.lot, %session, value = entry.value, ?outcome, "inserted record");
    let record = Record::new(entry.lot, entry.id_a, entry.id_b).with(session, entry.value);
    store.push_unchecked(record);
    outcome
}
