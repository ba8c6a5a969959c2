//! Movement rule engine.
//!
//! Given a tape id and a requested destination, the engine searches the
//! target, secondary and tertiary locations in the order the transition table
//! gives, then either does nothing, relocates, registers a new tape, or
//! rejects the move.
//!
//! ```text
//!              intake
//! Unregistered ------> Onsite <----> Offsite
//!                        ^
//!                        +---------> Retired
//! ```
//!
//! There is no Offsite <-> Retired edge.

mod relocate;
mod rules;

pub use rules::{rule_for, Operation, TransitionRule, TRANSITION_TABLE};

use crate::clock::{Clock, SystemClock};
use serde::Serialize;
use tapeflow_db::{LocationStore, StoreError};
use tapeflow_protocol::{Location, MediaType, Row, TapeId, TapeRecord};
use thiserror::Error;
use tracing::{info, warn};

/// One move requested by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub operation: Operation,
    pub tape_id: TapeId,
    /// Needed only when the move turns out to be an intake.
    pub media_type: Option<MediaType>,
}

impl MoveRequest {
    pub fn new(operation: Operation, tape_id: TapeId) -> Self {
        Self {
            operation,
            tape_id,
            media_type: None,
        }
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }
}

/// More than one row for the same id inside one location.
///
/// Every row is still processed; this is surfaced so the sheets can be cleaned up.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Tape {tape_id} has {count} rows in {location}; remove the duplicates")]
pub struct AmbiguousRecord {
    pub tape_id: TapeId,
    pub location: Location,
    pub count: usize,
}

impl AmbiguousRecord {
    /// `Some` when `count` matches exceed one.
    pub fn check(tape_id: &TapeId, location: Location, count: usize) -> Option<Self> {
        if count <= 1 {
            return None;
        }
        let record = Self {
            tape_id: tape_id.clone(),
            location,
            count,
        };
        warn!(tape_id = %tape_id, %location, count, "Duplicate tape rows");
        Some(record)
    }
}

/// Why a move was refused. Informational, nothing is written.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IllegalTransition {
    /// Found in a location that may not feed the requested target.
    #[error("Tape {tape_id} is currently {current}. Only {allowed_source} tapes can be moved to {requested}.")]
    WrongSource {
        tape_id: TapeId,
        current: Location,
        requested: Location,
        allowed_source: Location,
    },

    /// Found nowhere, and the target does not accept new tapes.
    #[error("Tape {tape_id} is not registered. Move it {intake_location} first before it can go to {requested}.")]
    NotRegistered {
        tape_id: TapeId,
        requested: Location,
        intake_location: Location,
    },
}

/// Result of a move that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// No writes were made.
    AlreadyAtTarget {
        tape_id: TapeId,
        location: Location,
        ambiguous: Option<AmbiguousRecord>,
    },
    Relocated {
        tape_id: TapeId,
        from: Location,
        to: Location,
        /// Rows as written to `to`, date refreshed.
        rows: Vec<Row>,
        ambiguous: Option<AmbiguousRecord>,
    },
    Registered { tape: TapeRecord },
    Rejected { rejection: IllegalTransition },
    /// Unknown tape headed Onsite without a media type; ask and retry.
    IntakeRequired { tape_id: TapeId },
}

impl MoveOutcome {
    pub fn ambiguous(&self) -> Option<&AmbiguousRecord> {
        match self {
            MoveOutcome::AlreadyAtTarget { ambiguous, .. } | MoveOutcome::Relocated { ambiguous, .. } => {
                ambiguous.as_ref()
            }
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum MovementError {
    /// A store could not be reached; nothing was written for the current row.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Some writes happened before a store failed. `lost` is a row removed
    /// from `from` that never reached `to`.
    #[error("Relocation of tape {tape_id} from {from} to {to} stopped after {} row(s): {source}", .moved.len())]
    PartialRelocation {
        tape_id: TapeId,
        from: Location,
        to: Location,
        moved: Vec<Row>,
        lost: Option<Row>,
        source: StoreError,
    },
}

impl MovementError {
    pub fn is_partial(&self) -> bool {
        matches!(self, MovementError::PartialRelocation { .. })
    }
}

/// Applies the transition table against an injected store.
pub struct MovementEngine<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: LocationStore> MovementEngine<S, SystemClock> {
    pub fn with_system_clock(store: S) -> Self {
        Self::new(store, SystemClock)
    }
}

impl<S: LocationStore, C: Clock> MovementEngine<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn apply(&self, request: &MoveRequest) -> Result<MoveOutcome, MovementError> {
        let rule = rule_for(request.operation);
        let tape_id = &request.tape_id;

        let hits = self.store.find(rule.target, tape_id)?;
        if !hits.is_empty() {
            info!(tape_id = %tape_id, location = %rule.target, "Tape already at target");
            return Ok(MoveOutcome::AlreadyAtTarget {
                tape_id: tape_id.clone(),
                location: rule.target,
                ambiguous: AmbiguousRecord::check(tape_id, rule.target, hits.len()),
            });
        }

        let hits = self.store.find(rule.secondary, tape_id)?;
        if !hits.is_empty() {
            return self.relocate(tape_id, rule.secondary, rule.target, hits);
        }

        let hits = self.store.find(rule.tertiary, tape_id)?;
        if !hits.is_empty() {
            if rule.tertiary_allowed {
                return self.relocate(tape_id, rule.tertiary, rule.target, hits);
            }
            let rejection = IllegalTransition::WrongSource {
                tape_id: tape_id.clone(),
                current: rule.tertiary,
                requested: rule.target,
                allowed_source: rule.secondary,
            };
            info!(tape_id = %tape_id, "Rejected move: {}", rejection);
            return Ok(MoveOutcome::Rejected { rejection });
        }

        if !rule.intake_allowed {
            let rejection = IllegalTransition::NotRegistered {
                tape_id: tape_id.clone(),
                requested: rule.target,
                intake_location: Location::Onsite,
            };
            info!(tape_id = %tape_id, "Rejected move: {}", rejection);
            return Ok(MoveOutcome::Rejected { rejection });
        }

        let Some(media_type) = request.media_type else {
            return Ok(MoveOutcome::IntakeRequired {
                tape_id: tape_id.clone(),
            });
        };

        let tape = TapeRecord::intake(tape_id.clone(), media_type, self.clock.today());
        self.store.append(tape.location, tape.to_row())?;
        info!(tape_id = %tape_id, media_type = %media_type, location = %tape.location, "Registered new tape");
        Ok(MoveOutcome::Registered { tape })
    }

    fn relocate(
        &self,
        tape_id: &TapeId,
        from: Location,
        to: Location,
        hits: Vec<tapeflow_protocol::RowPosition>,
    ) -> Result<MoveOutcome, MovementError> {
        let ambiguous = AmbiguousRecord::check(tape_id, from, hits.len());
        let rows = relocate::relocate(&self.store, tape_id, from, to, hits, self.clock.today())?;
        Ok(MoveOutcome::Relocated {
            tape_id: tape_id.clone(),
            from,
            to,
            rows,
            ambiguous,
        })
    }
}
