//! # Seigla-Controle: Milk-Control Record Keeping
//!
//! Records per-animal readings for a recurring control period: a lot, the two
//! identifiers SNIT and NORMAL, and up to three session readings (MATIN, MIDI,
//! SOIR). Each period is one table with the fixed header
//! `LOT, SNIT, NORMAL, MATIN, MIDI, SOIR`, stored as a Parquet file.
//!
//! ## Components
//!
//! - [`storage`]: tabular storage backend (`load_or_create`, `save`)
//! - [`directory`]: period file discovery and naming (`controle-MM-YY.parquet`)
//! - [`store`]: the in-memory working set of one open period
//! - [`matcher`]: key lookup tolerant of SNIT/NORMAL transposition
//! - [`updater`]: applies one entry as an update or an insert
//! - [`period`] and [`flow`]: period lifecycle and navigation state machine
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use seigla_controle::config::ControlConfig;
//! use seigla_controle::directory::ControlDirectory;
//! use seigla_controle::period::ControlPeriod;
//! use seigla_controle::record::Session;
//! use seigla_controle::storage::ParquetTableStorage;
//!
//! let directory = ControlDirectory::new(ControlConfig::builder("data").build()?);
//! let storage = ParquetTableStorage::new();
//!
//! let name = directory.new_period_name(&chrono::Local::now());
//! let mut period = ControlPeriod::open(&storage, &directory, &name)?;
//!
//! let outcome = period.submit(Session::Matin, "A", "5", "9", "12,5")?;
//! println!("{outcome}");
//!
//! period.flush(&storage)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod directory;
pub mod error;
pub mod flow;
pub mod matcher;
pub mod period;
pub mod record;
pub mod storage;
pub mod store;
pub mod updater;

pub use error::{Error, ErrorKind, Result, ValidationError};
pub use record::{Record, RecordKey, Session};
pub use updater::{submit, Outcome};
