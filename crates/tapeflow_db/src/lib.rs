//! Location store adapter for Tapeflow
//!
//! Every tape row lives in one of three sheets (Offsite, Onsite, Retired).
//! This crate is the only place that touches those sheets; the movement engine
//! and the CLI go through the [`LocationStore`] trait.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tapeflow_db::{CsvStore, LocationStore};
//! use tapeflow_protocol::{Location, TapeId};
//!
//! let store = CsvStore::open("~/.tapeflow/sheets")?;
//! let id = TapeId::parse("7001")?;
//! let hits = store.find(Location::Onsite, &id)?;
//! ```

mod csv_store;
mod error;
mod memory;
mod store;

pub use csv_store::CsvStore;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use store::LocationStore;
