//! The store contract the movement engine depends on.

use crate::error::{Result, StoreError};
use tapeflow_protocol::{Location, Row, RowPosition, TapeId};

/// Row-oriented access to the three location sheets.
///
/// Positions are 1-based and include the header (row 1), so the first data
/// row is row 2. Removing a row shifts every later row up by one; callers
/// removing several positions from one `find` result must go from the
/// highest position down.
///
/// Every operation may fail with [`StoreError::Unavailable`]. Implementations
/// do not retry.
pub trait LocationStore {
    /// Short backend name for logs and `config` output.
    fn backend_tag(&self) -> &'static str;

    /// Positions of every data row whose first cell equals `id`, ascending.
    fn find(&self, location: Location, id: &TapeId) -> Result<Vec<RowPosition>>;

    /// Header row followed by all data rows, in store order.
    fn read_all(&self, location: Location) -> Result<Vec<Row>>;

    /// Add `row` after the last row. No uniqueness check.
    fn append(&self, location: Location, row: Row) -> Result<()>;

    /// Delete the data row at `position`.
    fn remove(&self, location: Location, position: RowPosition) -> Result<()>;
}

impl<T: LocationStore + ?Sized> LocationStore for &T {
    fn backend_tag(&self) -> &'static str {
        (**self).backend_tag()
    }

    fn find(&self, location: Location, id: &TapeId) -> Result<Vec<RowPosition>> {
        (**self).find(location, id)
    }

    fn read_all(&self, location: Location) -> Result<Vec<Row>> {
        (**self).read_all(location)
    }

    fn append(&self, location: Location, row: Row) -> Result<()> {
        (**self).append(location, row)
    }

    fn remove(&self, location: Location, position: RowPosition) -> Result<()> {
        (**self).remove(location, position)
    }
}

impl<T: LocationStore + ?Sized> LocationStore for Box<T> {
    fn backend_tag(&self) -> &'static str {
        (**self).backend_tag()
    }

    fn find(&self, location: Location, id: &TapeId) -> Result<Vec<RowPosition>> {
        (**self).find(location, id)
    }

    fn read_all(&self, location: Location) -> Result<Vec<Row>> {
        (**self).read_all(location)
    }

    fn append(&self, location: Location, row: Row) -> Result<()> {
        (**self).append(location, row)
    }

    fn remove(&self, location: Location, position: RowPosition) -> Result<()> {
        (**self).remove(location, position)
    }
}

/// Scan a full sheet (header included) for exact id matches.
pub(crate) fn positions_of(sheet: &[Row], id: &TapeId) -> Vec<RowPosition> {
    sheet
        .iter()
        .skip(1)
        .enumerate()
        .filter(|(_, row)| row.matches_id(id))
        .map(|(idx, _)| RowPosition::from_data_index(idx))
        .collect()
}

/// Remove a data row from a full sheet, rejecting the header and out-of-range positions.
pub(crate) fn remove_at(sheet: &mut Vec<Row>, location: Location, position: RowPosition) -> Result<Row> {
    let idx = position.sheet_index();
    if position.is_header() || idx >= sheet.len() {
        return Err(StoreError::NoSuchRow { location, position });
    }
    Ok(sheet.remove(idx))
}
