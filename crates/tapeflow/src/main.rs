//! Tapeflow launcher
//!
//! With no subcommand (or `menu`) runs the interactive shell; otherwise runs
//! one command and exits. `--json` variants print machine-readable output,
//! including errors, on stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tapeflow::SystemClock;
use tapeflow_logging::{init_logging, LogConfig};
use tapeflow_protocol::Location;

mod cli;

use cli::config::Settings;

#[derive(Parser, Debug)]
#[command(name = "tapeflow", about = "Tape rotation management: Offsite, Onsite and Retired custody")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Directory holding the location sheets (forces the csv backend)
    #[arg(long, global = true, env = "TAPEFLOW_STORE_DIR")]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Move a tape to a location, registering it Onsite if it is new
    Move {
        /// Destination: offsite, onsite or retired
        location: Location,

        /// Tape id as printed on the label
        tape_id: String,

        /// Media type for a new tape (BRMS, DAILY, WEEKLY, MONTHLY)
        #[arg(short = 'm', long)]
        media_type: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show every location holding a tape
    Lookup {
        /// Tape id to look up
        tape_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the tapes in one location
    List {
        /// offsite, onsite or retired
        location: Location,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the resolved configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn command_wants_json(command: &Option<Commands>) -> bool {
    match command {
        Some(Commands::Move { json, .. })
        | Some(Commands::Lookup { json, .. })
        | Some(Commands::List { json, .. })
        | Some(Commands::Config { json }) => *json,
        Some(Commands::Menu) | None => false,
    }
}

fn run_command(cli: Cli) -> Result<()> {
    let settings = Settings::resolve(cli.store_dir)?;

    match cli.command {
        None | Some(Commands::Menu) => run_menu(&settings),
        Some(Commands::Move {
            location,
            tape_id,
            media_type,
            json,
        }) => cli::move_tape::run(
            cli::move_tape::MoveArgs {
                location,
                tape_id,
                media_type,
                json,
            },
            &settings,
        ),
        Some(Commands::Lookup { tape_id, json }) => cli::lookup::run(&tape_id, json, &settings),
        Some(Commands::List { location, json }) => cli::list::run(location, json, &settings),
        Some(Commands::Config { json }) => cli::config::run(&settings, json),
    }
}

fn run_menu(settings: &Settings) -> Result<()> {
    let store = settings.open_store()?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = cli::menu::Shell::new(store, SystemClock, stdin.lock(), stdout.lock())
        .with_countdown(settings.exit_countdown_secs);
    shell.run()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    let _log_guard = match init_logging(LogConfig {
        app_name: "tapeflow",
        verbose: cli.verbose,
        log_dir: None,
    }) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: logging disabled: {:#}", err);
            None
        }
    };

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
