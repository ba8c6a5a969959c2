//! `tapeflow move` - one custody move from the command line.

use crate::cli::config::Settings;
use crate::cli::error::HelpfulError;
use crate::cli::output::describe_outcome;
use serde::Serialize;
use tapeflow::{MoveOutcome, MoveRequest, MovementEngine, Operation};
use tapeflow_protocol::{Location, MediaType, TapeId};

#[derive(Debug)]
pub struct MoveArgs {
    pub location: Location,
    pub tape_id: String,
    pub media_type: Option<String>,
    pub json: bool,
}

#[derive(Serialize)]
struct MoveReport<'a> {
    operation: Operation,
    #[serde(flatten)]
    outcome: &'a MoveOutcome,
    message: String,
}

pub fn run(args: MoveArgs, settings: &Settings) -> anyhow::Result<()> {
    let tape_id = parse_tape_id(&args.tape_id)?;
    let media_type = args
        .media_type
        .as_deref()
        .map(|raw| {
            raw.parse::<MediaType>()
                .map_err(|_| HelpfulError::invalid_media_type(raw))
        })
        .transpose()?;

    let operation = Operation::to(args.location);
    let mut request = MoveRequest::new(operation, tape_id.clone());
    if let Some(media_type) = media_type {
        request = request.with_media_type(media_type);
    }

    let store = settings.open_store()?;
    let engine = MovementEngine::with_system_clock(store);
    let outcome = engine
        .apply(&request)
        .map_err(|err| HelpfulError::movement(&err))?;

    if let MoveOutcome::IntakeRequired { .. } = outcome {
        return Err(HelpfulError::media_type_required(&tape_id).into());
    }

    let lines = describe_outcome(&outcome);
    if args.json {
        let report = MoveReport {
            operation,
            outcome: &outcome,
            message: lines.first().cloned().unwrap_or_default(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

pub(crate) fn parse_tape_id(raw: &str) -> Result<TapeId, HelpfulError> {
    TapeId::parse(raw).map_err(|err| HelpfulError::invalid_tape_id(raw, &err))
}
