//! `tapeflow list` - inventory of one location.

use crate::cli::config::Settings;
use crate::cli::error::HelpfulError;
use crate::cli::output::inventory_table;
use serde::Serialize;
use tapeflow::LookupService;
use tapeflow_protocol::{Location, Row, TapeRecord};
use tracing::warn;

#[derive(Serialize)]
struct InventoryReport {
    location: Location,
    count: usize,
    tapes: Vec<TapeRecord>,
    /// Rows that could not be read as tapes, verbatim.
    unparsed: Vec<Row>,
}

pub fn run(location: Location, json: bool, settings: &Settings) -> anyhow::Result<()> {
    let service = LookupService::new(settings.open_store()?);
    let rows = service
        .inventory(location)
        .map_err(|err| HelpfulError::store(&err))?;

    if json {
        let mut tapes = Vec::with_capacity(rows.len());
        let mut unparsed = Vec::new();
        for row in &rows {
            match TapeRecord::from_row(location, row) {
                Ok(tape) => tapes.push(tape),
                Err(err) => {
                    warn!(%location, row = ?row.cells(), "Unreadable row: {}", err);
                    unparsed.push(row.clone());
                }
            }
        }
        let report = InventoryReport {
            location,
            count: rows.len(),
            tapes,
            unparsed,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match inventory_table(location, &rows) {
        Some(table) => {
            println!("{}", table);
            println!("{} tape(s) {}.", rows.len(), location);
        }
        None => println!("No tapes {}.", location),
    }
    Ok(())
}
