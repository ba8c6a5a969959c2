//! Output formatting utilities for CLI commands
//!
//! Tables and messages here are shared by the one-shot subcommands and the
//! interactive menu, so everything renders to a `String` or `Table` first.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use tapeflow::{LookupReport, MoveOutcome};
use tapeflow_protocol::{Location, Row};

/// Build a table with headers and rows
pub fn build_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let rows = rows
        .into_iter()
        .map(|row| row.into_iter().map(|text| (text, None)).collect())
        .collect();
    build_table_colored(headers, rows)
}

/// Build a table with custom cell colors
pub fn build_table_colored(headers: &[&str], rows: Vec<Vec<(String, Option<Color>)>>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for row in rows {
        let cells: Vec<Cell> = row
            .into_iter()
            .map(|(text, color)| {
                let cell = Cell::new(text);
                if let Some(c) = color {
                    cell.fg(c)
                } else {
                    cell
                }
            })
            .collect();
        table.add_row(cells);
    }

    table
}

/// Print a table with headers and rows
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    println!("{}", build_table(headers, rows));
}

/// Color for location labels
pub fn color_for_location(location: Location) -> Color {
    match location {
        Location::Offsite => Color::Yellow,
        Location::Onsite => Color::Green,
        Location::Retired => Color::DarkGrey,
    }
}

/// Cells of a stored row, padded to the three sheet columns.
fn row_cells(row: &Row) -> Vec<String> {
    (0..3)
        .map(|idx| row.cell(idx).unwrap_or("").to_string())
        .collect()
}

/// One location's inventory, or `None` when it holds no tapes.
pub fn inventory_table(location: Location, rows: &[Row]) -> Option<Table> {
    if rows.is_empty() {
        return None;
    }
    let color = color_for_location(location);
    let rows = rows
        .iter()
        .map(|row| {
            let mut cells = row_cells(row).into_iter();
            let id = cells.next().unwrap_or_default();
            let mut out = vec![(id, Some(color))];
            out.extend(cells.map(|text| (text, None)));
            out
        })
        .collect();
    Some(build_table_colored(&["Tape ID", "Media Type", "Last Moved"], rows))
}

/// Every matched row with its location, or `None` when the tape was not found.
pub fn lookup_table(report: &LookupReport) -> Option<Table> {
    if report.is_empty() {
        return None;
    }
    let mut rows = Vec::new();
    for section in &report.sections {
        let color = color_for_location(section.location);
        for row in &section.rows {
            let mut cells = vec![(section.location.to_string(), Some(color))];
            cells.extend(row_cells(row).into_iter().map(|text| (text, None)));
            rows.push(cells);
        }
    }
    Some(build_table_colored(
        &["Location", "Tape ID", "Media Type", "Last Moved"],
        rows,
    ))
}

/// Messages that go with a lookup table (or replace it when empty).
pub fn describe_lookup(report: &LookupReport) -> Vec<String> {
    if report.is_empty() {
        return vec![format!(
            "Tape {} was not found in any location.",
            report.tape_id
        )];
    }
    let mut lines = Vec::new();
    if report.spans_locations() {
        let names: Vec<String> = report.sections.iter().map(|s| s.location.to_string()).collect();
        lines.push(format!(
            "WARNING: Tape {} appears in more than one location: {}",
            report.tape_id,
            names.join(", ")
        ));
    }
    for section in &report.sections {
        if let Some(ambiguous) = &section.ambiguous {
            lines.push(format!("WARNING: {}", ambiguous));
        }
    }
    lines
}

/// Human-readable lines for a move outcome.
pub fn describe_outcome(outcome: &MoveOutcome) -> Vec<String> {
    let mut lines = Vec::new();
    match outcome {
        MoveOutcome::AlreadyAtTarget { tape_id, location, .. } => {
            lines.push(format!("Tape {} is already {}. Nothing changed.", tape_id, location));
        }
        MoveOutcome::Relocated {
            tape_id,
            from,
            to,
            rows,
            ..
        } => {
            let moved_on = rows
                .first()
                .and_then(|row| row.cell(2))
                .unwrap_or("today");
            lines.push(format!(
                "Tape {} moved from {} to {} on {}.",
                tape_id, from, to, moved_on
            ));
        }
        MoveOutcome::Registered { tape } => {
            lines.push(format!(
                "Tape {} registered {} as {} on {}.",
                tape.id,
                tape.location,
                tape.media_type,
                tapeflow_protocol::format_date(tape.last_moved)
            ));
        }
        MoveOutcome::Rejected { rejection } => {
            lines.push(rejection.to_string());
        }
        MoveOutcome::IntakeRequired { tape_id } => {
            lines.push(format!(
                "Tape {} is not registered. A media type is needed to add it Onsite.",
                tape_id
            ));
        }
    }
    if let Some(ambiguous) = outcome.ambiguous() {
        lines.push(format!("WARNING: {}", ambiguous));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapeflow::{IllegalTransition, LookupSection};
    use tapeflow_protocol::TapeId;

    fn row(tape: &str, media: &str, moved: &str) -> Row {
        Row::from_cells([tape, media, moved])
    }

    #[test]
    fn test_empty_inventory_has_no_table() {
        assert!(inventory_table(Location::Retired, &[]).is_none());
        let table = inventory_table(Location::Onsite, &[row("1", "DAILY", "01/01/2026")]).unwrap();
        let rendered = table.to_string();
        assert!(rendered.contains("Tape ID"));
        assert!(rendered.contains("01/01/2026"));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = inventory_table(Location::Onsite, &[Row::from_cells(["9"])]).unwrap();
        assert_eq!(table.row_iter().next().map(|r| r.cell_count()), Some(3));
    }

    #[test]
    fn test_describe_relocation_uses_written_date() {
        let outcome = MoveOutcome::Relocated {
            tape_id: TapeId::from_cell("5"),
            from: Location::Onsite,
            to: Location::Offsite,
            rows: vec![row("5", "WEEKLY", "19/10/2026")],
            ambiguous: None,
        };
        assert_eq!(
            describe_outcome(&outcome),
            vec!["Tape 5 moved from Onsite to Offsite on 19/10/2026.".to_string()]
        );
    }

    #[test]
    fn test_describe_rejection_uses_rule_message() {
        let outcome = MoveOutcome::Rejected {
            rejection: IllegalTransition::NotRegistered {
                tape_id: TapeId::from_cell("6"),
                requested: Location::Retired,
                intake_location: Location::Onsite,
            },
        };
        let lines = describe_outcome(&outcome);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("not registered"));
    }

    #[test]
    fn test_describe_lookup_flags_multiple_locations() {
        let report = LookupReport {
            tape_id: TapeId::from_cell("7"),
            sections: vec![
                LookupSection {
                    location: Location::Offsite,
                    rows: vec![row("7", "DAILY", "01/01/2026")],
                    ambiguous: None,
                },
                LookupSection {
                    location: Location::Onsite,
                    rows: vec![row("7", "DAILY", "02/01/2026")],
                    ambiguous: None,
                },
            ],
        };
        let lines = describe_lookup(&report);
        assert!(lines[0].contains("more than one location"));
        assert!(lookup_table(&report).is_some());
    }
}
