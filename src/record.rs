//! Record - one animal's readings for one control period

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed column order of every period table.
pub const HEADER_ROW: [&str; 6] = ["LOT", "SNIT", "NORMAL", "MATIN", "MIDI", "SOIR"];

/// Number of leading key columns (`LOT`, `SNIT`, `NORMAL`) every table must carry.
pub const KEY_COLUMNS: usize = 3;

/// One of the three daily measurement slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Session {
    /// Morning reading
    Matin,
    /// Midday reading
    Midi,
    /// Evening reading
    Soir,
}

impl Session {
    /// All sessions in column order.
    pub const ALL: [Self; 3] = [Self::Matin, Self::Midi, Self::Soir];

    /// Header column written by this session.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Matin => "MATIN",
            Self::Midi => "MIDI",
            Self::Soir => "SOIR",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Session {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MATIN" => Ok(Self::Matin),
            "MIDI" => Ok(Self::Midi),
            "SOIR" => Ok(Self::Soir),
            other => Err(format!("unknown session {other:?} (expected MATIN, MIDI or SOIR)")),
        }
    }
}

/// Matching key: lot plus the unordered identifier pair.
///
/// The pair is stored as `(min, max)` so that `{5, 9}` and `{9, 5}` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    lot: String,
    pair: (i64, i64),
}

impl RecordKey {
    /// Build a key from a lot and two identifiers in either order.
    #[must_use]
    pub fn new(lot: impl Into<String>, id_a: i64, id_b: i64) -> Self {
        Self {
            lot: lot.into(),
            pair: (id_a.min(id_b), id_a.max(id_b)),
        }
    }

    /// Lot component.
    #[must_use]
    pub fn lot(&self) -> &str {
        &self.lot
    }

    /// Normalized identifier pair (smaller first).
    #[must_use]
    pub const fn pair(&self) -> (i64, i64) {
        self.pair
    }
}

/// One animal's measurements for one control period.
///
/// `id_a` is the SNIT column and `id_b` the NORMAL column. Session readings
/// that were never entered are `None` and persist as null cells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    lot: String,
    id_a: i64,
    id_b: i64,
    matin: Option<f64>,
    midi: Option<f64>,
    soir: Option<f64>,
}

impl Record {
    /// Create a record with no session readings.
    #[must_use]
    pub fn new(lot: impl Into<String>, id_a: i64, id_b: i64) -> Self {
        Self {
            lot: lot.into(),
            id_a,
            id_b,
            matin: None,
            midi: None,
            soir: None,
        }
    }

    /// Set one session reading, consuming and returning the record.
    #[must_use]
    pub fn with(mut self, session: Session, value: f64) -> Self {
        self.set(session, value);
        self
    }

    /// Get the lot.
    #[must_use]
    pub fn lot(&self) -> &str {
        &self.lot
    }

    /// Get the SNIT identifier.
    #[must_use]
    pub const fn id_a(&self) -> i64 {
        self.id_a
    }

    /// Get the NORMAL identifier.
    #[must_use]
    pub const fn id_b(&self) -> i64 {
        self.id_b
    }

    /// Reading for `session`, if entered.
    #[must_use]
    pub const fn value(&self, session: Session) -> Option<f64> {
        match session {
            Session::Matin => self.matin,
            Session::Midi => self.midi,
            Session::Soir => self.soir,
        }
    }

    /// Overwrite the reading for `session`.
    pub fn set(&mut self, session: Session, value: f64) {
        self.set_optional(session, Some(value));
    }

    pub(crate) fn set_optional(&mut self, session: Session, value: Option<f64>) {
        match session {
            Session::Matin => self.matin = value,
            Session::Midi => self.midi = value,
            Session::Soir => self.soir = value,
        }
    }

    /// Matching key of this record.
    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.lot.clone(), self.id_a, self.id_b)
    }

    /// True when `lot` matches and `{id_a, id_b}` equals this record's pair in either order.
    #[must_use]
    pub fn matches(&self, lot: &str, id_a: i64, id_b: i64) -> bool {
        self.lot == lot
            && ((self.id_a == id_a && self.id_b == id_b) || (self.id_a == id_b && self.id_b == id_a))
    }
}
