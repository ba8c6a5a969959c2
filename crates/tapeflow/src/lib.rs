//! Tapeflow - Core Library
//!
//! Custody rules for backup tapes moving between Offsite, Onsite and Retired,
//! plus the lookup service that reports where a tape is.

pub mod clock;
pub mod lookup;
pub mod movement;

pub use clock::{Clock, FixedClock, SystemClock};
pub use lookup::{LookupReport, LookupSection, LookupService};
pub use movement::{
    rule_for, AmbiguousRecord, IllegalTransition, MoveOutcome, MoveRequest, MovementEngine,
    MovementError, Operation, TransitionRule, TRANSITION_TABLE,
};
