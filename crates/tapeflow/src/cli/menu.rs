//! Interactive menu shell.
//!
//! Generic over its input and output so it runs the same against a terminal
//! and against in-memory buffers. End of input anywhere exits cleanly.

use crate::cli::error::HelpfulError;
use crate::cli::output::{
    build_table, build_table_colored, color_for_location, describe_lookup, describe_outcome,
    inventory_table, lookup_table,
};
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tapeflow::{Clock, LookupService, MoveOutcome, MoveRequest, MovementEngine, Operation};
use tapeflow_db::LocationStore;
use tapeflow_protocol::{Location, MediaType, TapeId};
use tracing::{debug, info};

pub const SYSTEM_NAME: &str = "TAPE ROTATION MANAGEMENT SYSTEM";

const WELCOME_MSG: &str = "\
This CLI System is designed to manage and oversee the tape rotation
schedule across different media types, including BRMS, DAILY, WEEKLY, and MONTHLY.
It is tailored for IT department use, facilitating the monitoring and control of
backup tape storage locations, whether onsite, offsite, or retired.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Move(Operation),
    Lookup,
    List,
    Exit,
}

const MENU: [(&str, MenuAction); 6] = [
    ("Move tape offsite", MenuAction::Move(Operation::MoveOffsite)),
    ("Move tape onsite", MenuAction::Move(Operation::MoveOnsite)),
    ("Retire tape", MenuAction::Move(Operation::MoveRetired)),
    ("Look up tape", MenuAction::Lookup),
    ("List a location", MenuAction::List),
    ("Exit", MenuAction::Exit),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    EndOfInput,
}

pub struct Shell<S, C, R, W> {
    store: S,
    clock: C,
    input: R,
    output: W,
    countdown_secs: u64,
    tick: Duration,
}

impl<S, C, R, W> Shell<S, C, R, W>
where
    S: LocationStore,
    C: Clock,
    R: BufRead,
    W: Write,
{
    pub fn new(store: S, clock: C, input: R, output: W) -> Self {
        Self {
            store,
            clock,
            input,
            output,
            countdown_secs: 3,
            tick: Duration::from_secs(1),
        }
    }

    pub fn with_countdown(mut self, secs: u64) -> Self {
        self.countdown_secs = secs;
        self
    }

    /// Pause between countdown steps.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    pub fn run(&mut self) -> io::Result<()> {
        info!(backend = self.store.backend_tag(), "Interactive session started");
        writeln!(self.output, "{}", SYSTEM_NAME)?;
        writeln!(self.output, "{}", WELCOME_MSG)?;

        loop {
            writeln!(self.output)?;
            self.print_menu()?;
            let Some(choice) = self.prompt_number("Enter your choice", MENU.len())? else {
                return self.end_of_input();
            };

            let action = MENU[choice - 1].1;
            debug!(?action, "Menu selection");
            let flow = match action {
                MenuAction::Move(operation) => self.move_tape(operation)?,
                MenuAction::Lookup => self.lookup()?,
                MenuAction::List => self.list()?,
                MenuAction::Exit => {
                    self.countdown()?;
                    info!("Interactive session ended");
                    return Ok(());
                }
            };
            if flow == Flow::EndOfInput {
                return self.end_of_input();
            }
        }
    }

    fn print_menu(&mut self) -> io::Result<()> {
        let rows = MENU
            .iter()
            .enumerate()
            .map(|(idx, (label, _))| vec![(idx + 1).to_string(), label.to_string()])
            .collect();
        writeln!(self.output, "{}", build_table(&["#", "Menu"], rows))
    }

    fn move_tape(&mut self, operation: Operation) -> io::Result<Flow> {
        let Some(tape_id) = self.prompt_tape_id()? else {
            return Ok(Flow::EndOfInput);
        };

        let mut request = MoveRequest::new(operation, tape_id.clone());
        loop {
            let result = MovementEngine::new(&self.store, &self.clock).apply(&request);
            match result {
                Ok(MoveOutcome::IntakeRequired { .. }) => {
                    let Some(media_type) = self.prompt_media_type(&tape_id)? else {
                        return Ok(Flow::EndOfInput);
                    };
                    request = request.with_media_type(media_type);
                }
                Ok(outcome) => {
                    for line in describe_outcome(&outcome) {
                        writeln!(self.output, "{}", line)?;
                    }
                    return Ok(Flow::Continue);
                }
                Err(err) => {
                    write!(self.output, "{}", HelpfulError::movement(&err))?;
                    return Ok(Flow::Continue);
                }
            }
        }
    }

    fn lookup(&mut self) -> io::Result<Flow> {
        let Some(tape_id) = self.prompt_tape_id()? else {
            return Ok(Flow::EndOfInput);
        };

        match LookupService::new(&self.store).lookup(&tape_id) {
            Ok(report) => {
                if let Some(table) = lookup_table(&report) {
                    writeln!(self.output, "{}", table)?;
                }
                for line in describe_lookup(&report) {
                    writeln!(self.output, "{}", line)?;
                }
            }
            Err(err) => write!(self.output, "{}", HelpfulError::store(&err))?,
        }
        Ok(Flow::Continue)
    }

    fn list(&mut self) -> io::Result<Flow> {
        let rows = Location::ALL
            .iter()
            .enumerate()
            .map(|(idx, location)| {
                vec![
                    ((idx + 1).to_string(), None),
                    (location.to_string(), Some(color_for_location(*location))),
                ]
            })
            .collect();
        writeln!(self.output, "{}", build_table_colored(&["#", "Location"], rows))?;
        let Some(choice) = self.prompt_number("Which location", Location::ALL.len())? else {
            return Ok(Flow::EndOfInput);
        };
        let location = Location::ALL[choice - 1];

        match LookupService::new(&self.store).inventory(location) {
            Ok(rows) => match inventory_table(location, &rows) {
                Some(table) => {
                    writeln!(self.output, "{}", table)?;
                    writeln!(self.output, "{} tape(s) {}.", rows.len(), location)?;
                }
                None => writeln!(self.output, "No tapes {}.", location)?,
            },
            Err(err) => write!(self.output, "{}", HelpfulError::store(&err))?,
        }
        Ok(Flow::Continue)
    }

    fn prompt_media_type(&mut self, tape_id: &TapeId) -> io::Result<Option<MediaType>> {
        writeln!(
            self.output,
            "Tape {} is not registered yet. Select its media type:",
            tape_id
        )?;
        let rows = MediaType::ALL
            .iter()
            .enumerate()
            .map(|(idx, media)| vec![(idx + 1).to_string(), media.to_string()])
            .collect();
        writeln!(self.output, "{}", build_table(&["#", "Media Type"], rows))?;

        let max = MediaType::ALL.len();
        loop {
            let Some(raw) = self.read_line("Media type")? else {
                return Ok(None);
            };
            if let Ok(n) = raw.parse::<usize>() {
                if (1..=max).contains(&n) {
                    return Ok(Some(MediaType::ALL[n - 1]));
                }
            }
            match raw.parse::<MediaType>() {
                Ok(media_type) => return Ok(Some(media_type)),
                Err(err) => writeln!(
                    self.output,
                    "{}. Please enter a number between 1 and {}",
                    err, max
                )?,
            }
        }
    }

    fn prompt_tape_id(&mut self) -> io::Result<Option<TapeId>> {
        loop {
            let Some(raw) = self.read_line("Tape ID")? else {
                return Ok(None);
            };
            match TapeId::parse(&raw) {
                Ok(tape_id) => return Ok(Some(tape_id)),
                Err(err) => writeln!(self.output, "{}", err)?,
            }
        }
    }

    fn prompt_number(&mut self, prompt: &str, max: usize) -> io::Result<Option<usize>> {
        loop {
            let Some(raw) = self.read_line(prompt)? else {
                return Ok(None);
            };
            match raw.parse::<usize>() {
                Ok(n) if (1..=max).contains(&n) => return Ok(Some(n)),
                _ => writeln!(self.output, "Please enter a number between 1 and {}", max)?,
            }
        }
    }

    /// `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn countdown(&mut self) -> io::Result<()> {
        for remaining in (1..=self.countdown_secs).rev() {
            writeln!(self.output, "Exiting in {}...", remaining)?;
            self.output.flush()?;
            std::thread::sleep(self.tick);
        }
        writeln!(self.output, "Goodbye.")
    }

    fn end_of_input(&mut self) -> io::Result<()> {
        info!("Input closed, leaving interactive session");
        writeln!(self.output)?;
        writeln!(self.output, "Goodbye.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;
    use tapeflow::FixedClock;
    use tapeflow_db::MemoryStore;
    use tapeflow_protocol::Row;

    fn run_session(store: &MemoryStore, script: &str) -> String {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        let mut shell = Shell::new(store, &clock, Cursor::new(script.to_string()), Vec::new())
            .with_countdown(2)
            .with_tick(Duration::ZERO);
        shell.run().unwrap();
        String::from_utf8(shell.into_output()).unwrap()
    }

    fn row(tape: &str, media: &str, moved: &str) -> Row {
        Row::from_cells([tape, media, moved])
    }

    #[test]
    fn test_banner_menu_and_exit_countdown() {
        let store = MemoryStore::new();
        let out = run_session(&store, "6\n");

        assert!(out.starts_with(SYSTEM_NAME));
        assert!(out.contains("including BRMS, DAILY, WEEKLY, and MONTHLY."));
        assert!(out.contains("Retire tape"));
        assert!(out.contains("Exiting in 2..."));
        assert!(out.contains("Exiting in 1..."));
        assert!(out.trim_end().ends_with("Goodbye."));
    }

    #[test]
    fn test_invalid_menu_choices_reprompt() {
        let store = MemoryStore::new();
        let out = run_session(&store, "0\nseven\n9\n6\n");
        assert_eq!(out.matches("Please enter a number between 1 and 6").count(), 3);
        assert!(out.contains("Goodbye."));
    }

    #[test]
    fn test_end_of_input_exits_cleanly() {
        let store = MemoryStore::new();
        let out = run_session(&store, "2\n");
        assert!(out.trim_end().ends_with("Goodbye."));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_intake_prompts_for_media_type_until_valid() {
        let store = MemoryStore::new();
        let out = run_session(&store, "2\nbad id!\n7001\n5\nTAPE\n2\n6\n");

        assert!(out.contains("unexpected character"));
        assert!(out.contains("Tape 7001 is not registered yet"));
        assert_eq!(out.matches("Please enter a number between 1 and 4").count(), 2);
        assert!(out.contains("Tape 7001 registered Onsite as DAILY on 19/10/2026."));
        assert_eq!(store.rows(Location::Onsite), vec![row("7001", "DAILY", "19/10/2026")]);
    }

    #[test]
    fn test_media_type_by_name() {
        let store = MemoryStore::new();
        run_session(&store, "2\n88\nweekly\n6\n");
        assert_eq!(store.rows(Location::Onsite), vec![row("88", "WEEKLY", "19/10/2026")]);
    }

    #[test]
    fn test_rejected_move_is_reported_and_menu_continues() {
        let store = MemoryStore::new().with_row(Location::Offsite, row("31", "MONTHLY", "01/09/2026"));
        let out = run_session(&store, "3\n31\n4\n31\n6\n");

        assert!(out.contains("Only Onsite tapes can be moved to Retired"));
        assert!(out.contains("01/09/2026"));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_store_unavailable_returns_to_menu() {
        let store = MemoryStore::new().with_row(Location::Onsite, row("40", "DAILY", "01/01/2026"));
        store.set_unavailable(Location::Offsite, true);
        let out = run_session(&store, "1\n40\n6\n");

        assert!(out.contains("ERROR: Offsite store unavailable"));
        assert!(out.contains("Exiting in 1..."));
        assert_eq!(store.rows(Location::Onsite).len(), 1);
    }

    #[test]
    fn test_list_location() {
        let store = MemoryStore::new()
            .with_row(Location::Retired, row("50", "BRMS", "01/01/2020"))
            .with_row(Location::Retired, row("51", "BRMS", "01/01/2021"));
        let out = run_session(&store, "5\n3\n5\n1\n6\n");

        assert!(out.contains("2 tape(s) Retired."));
        assert!(out.contains("No tapes Offsite."));
    }

    #[test]
    fn test_lookup_unknown_tape() {
        let store = MemoryStore::new();
        let out = run_session(&store, "4\nNOPE\n6\n");
        assert!(out.contains("Tape NOPE was not found in any location."));
    }
}
