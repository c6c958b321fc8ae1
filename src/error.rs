//! Error types for seigla-controle
//!
//! Every failure reaches the caller as a distinct variant so the presentation
//! layer can react differently: re-focus an input field on [`Error::Validation`],
//! offer a retry on [`Error::StorageAccess`], reject the file on [`Error::Schema`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Rejected operator input. No state is mutated when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An input field was empty (after trimming)
    #[error("required field missing: {0}")]
    MissingField(&'static str),

    /// SNIT/NORMAL is not an integer, or the reading is not a number
    #[error("non-numeric field: {field} = {value:?}")]
    NonNumeric {
        /// Field name as shown to the operator
        field: &'static str,
        /// Text that failed to parse
        value: String,
    },

    /// Direct append of a record whose key is already present
    #[error("duplicate key: lot {lot:?} with identifiers {id_a}/{id_b} already recorded")]
    DuplicateKey {
        /// Lot of the rejected record
        lot: String,
        /// SNIT of the rejected record
        id_a: i64,
        /// NORMAL of the rejected record
        id_b: i64,
    },
}

/// Seigla-controle error types
#[derive(Error, Debug)]
pub enum Error {
    /// Operator input rejected
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Period file could not be read or written (held open elsewhere, corrupt, ...)
    #[error("Storage access error on {}: {message}\nThe in-memory records are intact; retry the save.", .path.display())]
    StorageAccess {
        /// File involved
        path: PathBuf,
        /// Underlying cause
        message: String,
    },

    /// Period file header does not match `LOT, SNIT, NORMAL, MATIN, MIDI, SOIR`
    #[error("Schema error in {}: unexpected columns {found:?}", .path.display())]
    Schema {
        /// File involved
        path: PathBuf,
        /// Column names (or description) actually found
        found: Vec<String>,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Leaving data entry while the period has unsaved submissions
    #[error("Unsaved changes in {0}: finish the session to save them first")]
    UnsavedChanges(String),

    /// Navigation event not accepted in the current state
    #[error("Event {event} not accepted while in state {state}")]
    InvalidEvent {
        /// Current navigation state
        state: &'static str,
        /// Rejected event
        event: &'static str,
    },
}

/// Coarse classification of [`Error`] for presentation-layer dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`Error::Validation`]
    Validation,
    /// See [`Error::StorageAccess`]
    StorageAccess,
    /// See [`Error::Schema`]
    Schema,
    /// See [`Error::Config`]
    Config,
    /// See [`Error::UnsavedChanges`] and [`Error::InvalidEvent`]
    Navigation,
}

impl Error {
    /// Build a [`Error::StorageAccess`] from any displayable cause
    pub(crate) fn storage(path: impl Into<PathBuf>, cause: impl std::fmt::Display) -> Self {
        Self::StorageAccess {
            path: path.into(),
            message: cause.to_string(),
        }
    }

    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::StorageAccess { .. } => ErrorKind::StorageAccess,
            Self::Schema { .. } => ErrorKind::Schema,
            Self::Config(_) => ErrorKind::Config,
            Self::UnsavedChanges(_) | Self::InvalidEvent { .. } => ErrorKind::Navigation,
        }
    }

    /// Whether repeating the same operation may succeed (only storage access failures)
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageAccess { .. })
    }
}
