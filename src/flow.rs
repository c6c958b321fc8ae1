//! Navigation state machine driven by discrete operator events
//!
//! ```text
//! ListPeriods ──OpenPeriod/NewPeriod──> SelectSession ──ChooseSession──> EnterData
//!      ▲                                  │     ▲                            │
//!      └───────────────Back───────────────┘     └──────Finish / Back─────────┘
//! ```
//!
//! The flow owns the storage backend and the directory; the presentation layer
//! only sends [`Event`]s and renders the returned [`Response`]s.

use crate::directory::ControlDirectory;
use crate::period::ControlPeriod;
use crate::record::Session;
use crate::storage::TableStorage;
use crate::updater::Outcome;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::mem;
use tracing::{debug, info};

/// Operator event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Re-list the available periods
    Refresh,
    /// Open an existing period file
    OpenPeriod(String),
    /// Start (or reopen) the period of the given date
    NewPeriod(NaiveDate),
    /// Pick the session to enter readings for
    ChooseSession(Session),
    /// Submit one entry, raw text as typed
    Submit {
        /// LOT field
        lot: String,
        /// SNIT field
        id_a: String,
        /// NORMAL field
        id_b: String,
        /// Reading field
        value: String,
    },
    /// Save the period and return to session selection
    Finish,
    /// Go back one screen
    Back,
}

impl Event {
    /// Short event name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Refresh => "Refresh",
            Self::OpenPeriod(_) => "OpenPeriod",
            Self::NewPeriod(_) => "NewPeriod",
            Self::ChooseSession(_) => "ChooseSession",
            Self::Submit { .. } => "Submit",
            Self::Finish => "Finish",
            Self::Back => "Back",
        }
    }
}

/// Current screen.
#[derive(Debug)]
pub enum FlowState {
    /// Period list
    ListPeriods,
    /// Session choice for a selected period
    SelectSession {
        /// Selected period filename
        filename: String,
    },
    /// Data entry into a loaded period
    EnterData {
        /// Loaded period
        period: ControlPeriod,
        /// Active session
        session: Session,
    },
}

impl FlowState {
    /// Short state name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ListPeriods => "ListPeriods",
            Self::SelectSession { .. } => "SelectSession",
            Self::EnterData { .. } => "EnterData",
        }
    }
}

/// What the presentation layer should show after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Period filenames, newest first, with their display names
    Periods(Vec<(String, String)>),
    /// Session menu for a period (display name)
    SessionMenu(String),
    /// Entry screen opened
    EntryOpened {
        /// Screen title, e.g. `SESSION MATIN`
        title: String,
        /// Records already in the period
        records: usize,
    },
    /// Entry accepted
    Submitted(Outcome),
    /// Period written
    Saved {
        /// Period filename
        filename: String,
        /// Records written
        records: usize,
    },
}

/// Event-driven navigation over one storage backend and directory.
#[derive(Debug)]
pub struct Flow<S: TableStorage> {
    storage: S,
    directory: ControlDirectory,
    state: FlowState,
}

impl<S: TableStorage> Flow<S> {
    /// Start on the period list.
    pub const fn new(storage: S, directory: ControlDirectory) -> Self {
        Self {
            storage,
            directory,
            state: FlowState::ListPeriods,
        }
    }

    /// Current state.
    pub const fn state(&self) -> &FlowState {
        &self.state
    }

    /// Storage backend.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Period directory.
    pub const fn directory(&self) -> &ControlDirectory {
        &self.directory
    }

    /// Period open for data entry, if any.
    pub const fn period(&self) -> Option<&ControlPeriod> {
        match &self.state {
            FlowState::EnterData { period, .. } => Some(period),
            _ => None,
        }
    }

    /// Handle one event.
    ///
    /// On error the state is unchanged; a failed `Finish` stays in data entry
    /// with every record kept.
    ///
    /// # Errors
    ///
    /// Validation, storage, schema and navigation errors, each as its own
    /// [`Error`] variant
    pub fn handle(&mut self, event: Event) -> Result<Response> {
        debug!(state = self.state.name(), event = event.name(), "flow event");
        let state = mem::replace(&mut self.state, FlowState::ListPeriods);
        let (next, result) = self.transition(state, event);
        self.state = next;
        result
    }

    fn transition(&self, state: FlowState, event: Event) -> (FlowState, Result<Response>) {
        match (state, event) {
            (FlowState::ListPeriods, Event::Refresh) => {
                let result = self.periods();
                (FlowState::ListPeriods, result)
            }
            (FlowState::ListPeriods, Event::OpenPeriod(filename)) => self.select(filename),
            (FlowState::ListPeriods, Event::NewPeriod(date)) => {
                let filename = self.directory.new_period_name(&date);
                info!(period = %filename, "starting control period");
                self.select(filename)
            }
            (FlowState::SelectSession { filename }, Event::ChooseSession(session)) => {
                match ControlPeriod::open(&self.storage, &self.directory, &filename) {
                    Ok(period) => {
                        let response = Response::EntryOpened {
                            title: format!("SESSION {session}"),
                            records: period.store().len(),
                        };
                        (FlowState::EnterData { period, session }, Ok(response))
                    }
                    Err(e) => (FlowState::SelectSession { filename }, Err(e)),
                }
            }
            (FlowState::SelectSession { filename }, Event::Back) => match self.periods() {
                Ok(response) => (FlowState::ListPeriods, Ok(response)),
                Err(e) => (FlowState::SelectSession { filename }, Err(e)),
            },
            (FlowState::EnterData { mut period, session }, Event::Submit { lot, id_a, id_b, value }) => {
                let result = period
                    .submit(session, &lot, &id_a, &id_b, &value)
                    .map(Response::Submitted);
                (FlowState::EnterData { period, session }, result)
            }
            (FlowState::EnterData { mut period, session }, Event::Finish) => {
                match period.flush(&self.storage) {
                    Ok(()) => {
                        let response = Response::Saved {
                            filename: period.filename().to_string(),
                            records: period.store().len(),
                        };
                        let filename = period.close_into_filename();
                        (FlowState::SelectSession { filename }, Ok(response))
                    }
                    Err(e) => (FlowState::EnterData { period, session }, Err(e)),
                }
            }
            (FlowState::EnterData { period, session }, Event::Back) => {
                if period.is_dirty() {
                    let err = Error::UnsavedChanges(period.filename().to_string());
                    return (FlowState::EnterData { period, session }, Err(err));
                }
                let filename = period.close_into_filename();
                let menu = self.directory.display_name(&filename).to_string();
                (FlowState::SelectSession { filename }, Ok(Response::SessionMenu(menu)))
            }
            (state, event) => {
                let err = Error::InvalidEvent {
                    state: state.name(),
                    event: event.name(),
                };
                (state, Err(err))
            }
        }
    }

    fn select(&self, filename: String) -> (FlowState, Result<Response>) {
        let menu = self.directory.display_name(&filename).to_string();
        (FlowState::SelectSession { filename }, Ok(Response::SessionMenu(menu)))
    }

    fn periods(&self) -> Result<Response> {
        let periods = self
            .directory
            .list_periods()?
            .into_iter()
            .map(|f| {
                let display = self.directory.display_name(&f).to_string();
                (f, display)
            })
            .collect();
        Ok(Response::Periods(periods))
    }
}
