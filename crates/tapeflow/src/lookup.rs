//! Read-only queries: where is a tape, and what is in a location.

use crate::movement::AmbiguousRecord;
use serde::Serialize;
use tapeflow_db::{LocationStore, StoreError};
use tapeflow_protocol::{Location, Row, TapeId};
use tracing::debug;

/// Matching rows from one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupSection {
    pub location: Location,
    pub rows: Vec<Row>,
    pub ambiguous: Option<AmbiguousRecord>,
}

/// Every location holding the tape, in store order. Empty when the tape is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupReport {
    pub tape_id: TapeId,
    pub sections: Vec<LookupSection>,
}

impl LookupReport {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, location: Location) -> Option<&LookupSection> {
        self.sections.iter().find(|section| section.location == location)
    }

    /// More than one location holds the tape.
    pub fn spans_locations(&self) -> bool {
        self.sections.len() > 1
    }
}

pub struct LookupService<S> {
    store: S,
}

impl<S: LocationStore> LookupService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn lookup(&self, tape_id: &TapeId) -> Result<LookupReport, StoreError> {
        let mut sections = Vec::new();
        for location in Location::ALL {
            let sheet = self.store.read_all(location)?;
            let rows: Vec<Row> = sheet
                .into_iter()
                .skip(1)
                .filter(|row| row.matches_id(tape_id))
                .collect();
            if rows.is_empty() {
                continue;
            }
            debug!(tape_id = %tape_id, %location, matches = rows.len(), "Lookup hit");
            sections.push(LookupSection {
                location,
                ambiguous: AmbiguousRecord::check(tape_id, location, rows.len()),
                rows,
            });
        }
        Ok(LookupReport {
            tape_id: tape_id.clone(),
            sections,
        })
    }

    /// All data rows of one location, header excluded.
    pub fn inventory(&self, location: Location) -> Result<Vec<Row>, StoreError> {
        let sheet = self.store.read_all(location)?;
        Ok(sheet.into_iter().skip(1).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapeflow_db::MemoryStore;

    fn row(tape: &str, media: &str, moved: &str) -> Row {
        Row::from_cells([tape, media, moved])
    }

    fn id(raw: &str) -> TapeId {
        TapeId::parse(raw).unwrap()
    }

    #[test]
    fn test_lookup_retired_only() {
        let store = MemoryStore::new()
            .with_row(Location::Onsite, row("11", "DAILY", "01/01/2026"))
            .with_row(Location::Retired, row("12", "BRMS", "03/02/2024"));
        let service = LookupService::new(&store);

        let report = service.lookup(&id("12")).unwrap();

        assert_eq!(report.sections.len(), 1);
        let section = report.section(Location::Retired).unwrap();
        assert_eq!(section.rows, vec![row("12", "BRMS", "03/02/2024")]);
        assert!(section.ambiguous.is_none());
        assert!(report.section(Location::Onsite).is_none());
    }

    #[test]
    fn test_lookup_unknown_tape_is_empty() {
        let store = MemoryStore::new().with_row(Location::Offsite, row("13", "WEEKLY", "01/01/2026"));
        let report = LookupService::new(&store).lookup(&id("99")).unwrap();
        assert!(report.is_empty());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_lookup_reports_duplicates_and_multiple_locations() {
        let store = MemoryStore::new()
            .with_row(Location::Offsite, row("14", "DAILY", "01/01/2026"))
            .with_row(Location::Onsite, row("14", "DAILY", "02/01/2026"))
            .with_row(Location::Onsite, row("14", "WEEKLY", "03/01/2026"));

        let report = LookupService::new(&store).lookup(&id("14")).unwrap();

        assert!(report.spans_locations());
        let locations: Vec<_> = report.sections.iter().map(|s| s.location).collect();
        assert_eq!(locations, vec![Location::Offsite, Location::Onsite]);
        assert_eq!(
            report.section(Location::Onsite).and_then(|s| s.ambiguous.as_ref()).map(|a| a.count),
            Some(2)
        );
    }

    #[test]
    fn test_lookup_propagates_unavailable() {
        let store = MemoryStore::new();
        store.set_unavailable(Location::Onsite, true);
        let err = LookupService::new(&store).lookup(&id("15")).unwrap_err();
        assert_eq!(err.location(), Some(Location::Onsite));
    }

    #[test]
    fn test_inventory_skips_header() {
        let store = MemoryStore::new()
            .with_row(Location::Offsite, row("16", "DAILY", "01/01/2026"))
            .with_row(Location::Offsite, row("17", "MONTHLY", "01/01/2026"));
        let rows = LookupService::new(&store).inventory(Location::Offsite).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(LookupService::new(&store).inventory(Location::Retired).unwrap().is_empty());
    }
}
