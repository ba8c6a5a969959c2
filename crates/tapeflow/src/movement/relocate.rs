//! Relocation primitive: remove from one sheet, append to another.
//!
//! The store has no cross-sheet move, so this is not atomic. Row content is
//! read before anything is deleted; positions are processed highest first so
//! earlier removals never shift a position still waiting in the batch.

use super::MovementError;
use chrono::NaiveDate;
use tapeflow_db::{LocationStore, StoreError};
use tapeflow_protocol::{Location, Row, RowPosition, TapeId};
use tracing::{error, info};

pub(crate) fn relocate<S: LocationStore>(
    store: &S,
    tape_id: &TapeId,
    from: Location,
    to: Location,
    positions: Vec<RowPosition>,
    today: NaiveDate,
) -> Result<Vec<Row>, MovementError> {
    let sheet = store.read_all(from)?;

    let mut batch = Vec::with_capacity(positions.len());
    for position in positions {
        match sheet.get(position.sheet_index()) {
            Some(row) if !position.is_header() && row.matches_id(tape_id) => {
                batch.push((position, row.clone()));
            }
            _ => {
                return Err(StoreError::NoSuchRow {
                    location: from,
                    position,
                }
                .into())
            }
        }
    }
    batch.sort_by(|a, b| b.0.cmp(&a.0));

    let mut moved = Vec::with_capacity(batch.len());
    for (position, row) in batch {
        let updated = row.with_last_moved(today);

        if let Err(source) = store.remove(from, position) {
            if moved.is_empty() {
                return Err(source.into());
            }
            error!(tape_id = %tape_id, %from, %to, moved = moved.len(), "Relocation stopped part-way: {}", source);
            return Err(MovementError::PartialRelocation {
                tape_id: tape_id.clone(),
                from,
                to,
                moved,
                lost: None,
                source,
            });
        }

        if let Err(source) = store.append(to, updated.clone()) {
            error!(
                tape_id = %tape_id,
                %from,
                %to,
                row = ?row.cells(),
                "Row removed from {} but not written to {}: {}",
                from,
                to,
                source
            );
            return Err(MovementError::PartialRelocation {
                tape_id: tape_id.clone(),
                from,
                to,
                moved,
                lost: Some(row),
                source,
            });
        }

        info!(tape_id = %tape_id, %from, %to, position = position.get(), "Relocated tape row");
        moved.push(updated);
    }

    Ok(moved)
}
