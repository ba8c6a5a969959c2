//! `tapeflow lookup` - where is a tape.

use crate::cli::config::Settings;
use crate::cli::error::HelpfulError;
use crate::cli::move_tape::parse_tape_id;
use crate::cli::output::{describe_lookup, lookup_table};
use tapeflow::LookupService;

pub fn run(raw_id: &str, json: bool, settings: &Settings) -> anyhow::Result<()> {
    let tape_id = parse_tape_id(raw_id)?;
    let service = LookupService::new(settings.open_store()?);
    let report = service
        .lookup(&tape_id)
        .map_err(|err| HelpfulError::store(&err))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(table) = lookup_table(&report) {
        println!("{}", table);
    }
    for line in describe_lookup(&report) {
        println!("{}", line);
    }
    Ok(())
}
