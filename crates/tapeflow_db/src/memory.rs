//! In-memory store backend.
//!
//! Used by engine tests and by `store.backend = "memory"` for dry runs.
//! Faults can be injected per location to exercise the unavailable and
//! partial-relocation paths.

use crate::error::{Result, StoreError};
use crate::store::{positions_of, remove_at, LocationStore};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tapeflow_protocol::{Location, Row, RowPosition, TapeId};
use tracing::debug;

#[derive(Debug, Default)]
struct Faults {
    unavailable: HashSet<Location>,
    /// (appends still allowed, appends to fail after that)
    failing_appends: HashMap<Location, (usize, usize)>,
}

pub struct MemoryStore {
    sheets: Mutex<BTreeMap<Location, Vec<Row>>>,
    faults: Mutex<Faults>,
    writes: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Three empty sheets, each holding only the header row.
    pub fn new() -> Self {
        let sheets = Location::ALL
            .iter()
            .map(|location| (*location, vec![Row::header()]))
            .collect();
        Self {
            sheets: Mutex::new(sheets),
            faults: Mutex::new(Faults::default()),
            writes: AtomicU64::new(0),
        }
    }

    /// Builder-style seeding for tests.
    pub fn with_row(self, location: Location, row: Row) -> Self {
        self.seed(location, row);
        self
    }

    /// Insert a row without counting it as a write or consulting faults.
    pub fn seed(&self, location: Location, row: Row) {
        let mut sheets = self.sheets.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        sheets.entry(location).or_default().push(row);
    }

    /// Data rows of one location (header excluded).
    pub fn rows(&self, location: Location) -> Vec<Row> {
        self.snapshot().remove(&location).unwrap_or_default()
    }

    /// Data rows of every location.
    pub fn snapshot(&self) -> BTreeMap<Location, Vec<Row>> {
        let sheets = self.sheets.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        sheets
            .iter()
            .map(|(location, rows)| (*location, rows.iter().skip(1).cloned().collect()))
            .collect()
    }

    /// Number of successful appends and removes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Make every operation on `location` fail as unavailable.
    pub fn set_unavailable(&self, location: Location, unavailable: bool) {
        let mut faults = self.faults.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if unavailable {
            faults.unavailable.insert(location);
        } else {
            faults.unavailable.remove(&location);
        }
    }

    /// Fail the next `count` appends to `location`; reads and removes still work.
    pub fn fail_next_appends(&self, location: Location, count: usize) {
        self.fail_appends_after(location, 0, count);
    }

    /// Let `allowed` appends to `location` through, then fail the next `count`.
    pub fn fail_appends_after(&self, location: Location, allowed: usize, count: usize) {
        let mut faults = self.faults.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        faults.failing_appends.insert(location, (allowed, count));
    }

    fn check_available(&self, location: Location) -> Result<()> {
        let faults = self.lock_faults(location)?;
        if faults.unavailable.contains(&location) {
            return Err(StoreError::unavailable(location, "connection lost"));
        }
        Ok(())
    }

    fn take_append_fault(&self, location: Location) -> Result<()> {
        let mut faults = self.lock_faults(location)?;
        if let Some((allowed, failing)) = faults.failing_appends.get_mut(&location) {
            if *allowed > 0 {
                *allowed -= 1;
            } else if *failing > 0 {
                *failing -= 1;
                return Err(StoreError::unavailable(location, "append rejected"));
            }
        }
        Ok(())
    }

    fn lock_faults(&self, location: Location) -> Result<MutexGuard<'_, Faults>> {
        self.faults
            .lock()
            .map_err(|_| StoreError::unavailable(location, "memory store lock poisoned"))
    }

    fn lock_sheets(&self, location: Location) -> Result<MutexGuard<'_, BTreeMap<Location, Vec<Row>>>> {
        self.sheets
            .lock()
            .map_err(|_| StoreError::unavailable(location, "memory store lock poisoned"))
    }
}

impl LocationStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    fn find(&self, location: Location, id: &TapeId) -> Result<Vec<RowPosition>> {
        self.check_available(location)?;
        let sheets = self.lock_sheets(location)?;
        Ok(sheets
            .get(&location)
            .map(|sheet| positions_of(sheet, id))
            .unwrap_or_default())
    }

    fn read_all(&self, location: Location) -> Result<Vec<Row>> {
        self.check_available(location)?;
        let sheets = self.lock_sheets(location)?;
        Ok(sheets.get(&location).cloned().unwrap_or_default())
    }

    fn append(&self, location: Location, row: Row) -> Result<()> {
        self.check_available(location)?;
        self.take_append_fault(location)?;
        let mut sheets = self.lock_sheets(location)?;
        sheets.entry(location).or_default().push(row);
        self.writes.fetch_add(1, Ordering::Relaxed);
        debug!(location = %location, "Appended row");
        Ok(())
    }

    fn remove(&self, location: Location, position: RowPosition) -> Result<()> {
        self.check_available(location)?;
        let mut sheets = self.lock_sheets(location)?;
        let sheet = sheets.entry(location).or_default();
        remove_at(sheet, location, position)?;
        self.writes.fetch_add(1, Ordering::Relaxed);
        debug!(location = %location, position = position.get(), "Removed row");
        Ok(())
    }
}
