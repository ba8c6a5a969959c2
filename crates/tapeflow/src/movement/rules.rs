//! Transition table.
//!
//! Each move operation names the location it moves to and the order in which
//! the other two locations are searched. Which of those may feed the target
//! is data here, not branching in the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tapeflow_protocol::{Location, ProtocolError};

/// Requested custody move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    MoveOffsite,
    MoveOnsite,
    MoveRetired,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Operation::MoveOffsite,
        Operation::MoveOnsite,
        Operation::MoveRetired,
    ];

    /// The operation whose target is `location`.
    pub fn to(location: Location) -> Self {
        match location {
            Location::Offsite => Operation::MoveOffsite,
            Location::Onsite => Operation::MoveOnsite,
            Location::Retired => Operation::MoveRetired,
        }
    }

    pub fn target(&self) -> Location {
        rule_for(*self).target
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::MoveOffsite => "move_offsite",
            Operation::MoveOnsite => "move_onsite",
            Operation::MoveRetired => "move_retired",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ProtocolError;

    /// Accepts a target location name (`offsite`) or the operation name (`move_offsite`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let location = normalized.strip_prefix("move_").unwrap_or(&normalized);
        location
            .parse::<Location>()
            .map(Operation::to)
            .map_err(|_| ProtocolError::InvalidLocation(s.to_string()))
    }
}

/// Search order and permissions for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub operation: Operation,
    pub target: Location,
    /// Searched second; tapes found here always move to `target`.
    pub secondary: Location,
    /// Searched last; tapes found here move only if `tertiary_allowed`.
    pub tertiary: Location,
    pub tertiary_allowed: bool,
    /// Unknown tapes are registered into `target`.
    pub intake_allowed: bool,
}

/// Legal edges: Unregistered -> Onsite, Onsite <-> Offsite, Onsite <-> Retired.
pub const TRANSITION_TABLE: [TransitionRule; 3] = [
    TransitionRule {
        operation: Operation::MoveOffsite,
        target: Location::Offsite,
        secondary: Location::Onsite,
        tertiary: Location::Retired,
        tertiary_allowed: false,
        intake_allowed: false,
    },
    TransitionRule {
        operation: Operation::MoveOnsite,
        target: Location::Onsite,
        secondary: Location::Offsite,
        tertiary: Location::Retired,
        tertiary_allowed: true,
        intake_allowed: true,
    },
    TransitionRule {
        operation: Operation::MoveRetired,
        target: Location::Retired,
        secondary: Location::Onsite,
        tertiary: Location::Offsite,
        tertiary_allowed: false,
        intake_allowed: false,
    },
];

pub fn rule_for(operation: Operation) -> &'static TransitionRule {
    match operation {
        Operation::MoveOffsite => &TRANSITION_TABLE[0],
        Operation::MoveOnsite => &TRANSITION_TABLE[1],
        Operation::MoveRetired => &TRANSITION_TABLE[2],
    }
}
