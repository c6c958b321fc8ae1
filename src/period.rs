//! Control period lifecycle
//!
//! ```text
//! Unopened ──open──> Loaded ──submit──> Modified ──flush──> Flushed ──close──> Closed
//!                      │                  ▲  │                 │
//!                      │                  └──┘ (submit)        └──submit──> Modified
//!                      └──────────────flush────────────────────> Flushed
//! ```
//!
//! A failed flush leaves the period in `Modified` with all records intact, so
//! the operator can retry once the file is no longer held elsewhere.

use crate::directory::ControlDirectory;
use crate::record::Session;
use crate::storage::TableStorage;
use crate::store::RecordStore;
use crate::updater::{self, Outcome};
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where an open period stands relative to its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodState {
    /// Freshly loaded, identical to the file
    Loaded,
    /// Has submissions not yet written
    Modified,
    /// Written; identical to the file
    Flushed,
}

/// One open control period: its file and its working set.
#[derive(Debug)]
pub struct ControlPeriod {
    filename: String,
    path: PathBuf,
    store: RecordStore,
    state: PeriodState,
}

impl ControlPeriod {
    /// Open the period `filename`, creating a header-only table if absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageAccess`] or [`crate::Error::Schema`] if
    /// the table cannot be loaded
    pub fn open<S: TableStorage + ?Sized>(
        storage: &S,
        directory: &ControlDirectory,
        filename: &str,
    ) -> Result<Self> {
        let path = directory.path_for(filename);
        let records = storage.load_or_create(&path)?;
        info!(period = filename, records = records.len(), "opened control period");
        Ok(Self {
            filename: filename.to_string(),
            path,
            store: RecordStore::from_records(records),
            state: PeriodState::Loaded,
        })
    }

    /// Period filename.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Full path of the period table.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Working set (read-only).
    #[must_use]
    pub const fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> PeriodState {
        self.state
    }

    /// Whether there are submissions not yet flushed.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state == PeriodState::Modified
    }

    /// Apply one entry for `session`. See [`updater::submit`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`]; the period is unchanged in that case
    pub fn submit(
        &mut self,
        session: Session,
        lot: &str,
        id_a_text: &str,
        id_b_text: &str,
        value_text: &str,
    ) -> Result<Outcome> {
        let outcome = updater::submit(&mut self.store, session, lot, id_a_text, id_b_text, value_text)?;
        self.state = PeriodState::Modified;
        Ok(outcome)
    }

    /// Write the whole working set to the period table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageAccess`]; the working set and the dirty
    /// state are kept so the flush can be retried
    pub fn flush<S: TableStorage + ?Sized>(&mut self, storage: &S) -> Result<()> {
        storage.save(&self.path, self.store.records())?;
        self.state = PeriodState::Flushed;
        Ok(())
    }

    /// Close the period, handing back its records.
    pub fn close(self) -> RecordStore {
        if self.is_dirty() {
            warn!(period = %self.filename, records = self.store.len(), "closing period with unsaved changes");
        }
        self.store
    }

    pub(crate) fn close_into_filename(self) -> String {
        let filename = self.filename.clone();
        self.close();
        filename
    }

    /// Session context for entering `session` readings into this period.
    pub fn session(&mut self, session: Session) -> SessionContext<'_> {
        SessionContext {
            period: self,
            session,
        }
    }
}

/// An open period together with the active session.
///
/// Entry operations take this explicitly instead of reading a process-wide
/// "current file" and "current session".
#[derive(Debug)]
pub struct SessionContext<'a> {
    period: &'a mut ControlPeriod,
    session: Session,
}

impl SessionContext<'_> {
    /// Active session.
    #[must_use]
    pub const fn active_session(&self) -> Session {
        self.session
    }

    /// The period being edited.
    #[must_use]
    pub fn period(&self) -> &ControlPeriod {
        &*self.period
    }

    /// Submit one entry for the active session.
    ///
    /// # Errors
    ///
    /// See [`ControlPeriod::submit`]
    pub fn submit(&mut self, lot: &str, id_a_text: &str, id_b_text: &str, value_text: &str) -> Result<Outcome> {
        self.period.submit(self.session, lot, id_a_text, id_b_text, value_text)
    }

    /// Flush the period.
    ///
    /// # Errors
    ///
    /// See [`ControlPeriod::flush`]
    pub fn flush<S: TableStorage + ?Sized>(&mut self, storage: &S) -> Result<()> {
        self.period.flush(storage)
    }
}
