//! Error types for the store layer.

use std::fmt;
use std::path::PathBuf;
use tapeflow_protocol::{Location, RowPosition};
use thiserror::Error;

/// Store operation result type.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing sheet could not be reached or read. Never retried here.
    #[error("{location} store unavailable: {reason}")]
    Unavailable { location: Location, reason: String },

    /// Remove addressed the header or a row past the end
    #[error("{location} store has no data {position}")]
    NoSuchRow {
        location: Location,
        position: RowPosition,
    },

    /// Store directory could not be prepared
    #[error("Cannot open store at {}: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },
}

impl StoreError {
    /// Create an unavailable error.
    pub fn unavailable(location: Location, reason: impl fmt::Display) -> Self {
        Self::Unavailable {
            location,
            reason: reason.to_string(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            Self::Unavailable { location, .. } | Self::NoSuchRow { location, .. } => Some(*location),
            Self::Open { .. } => None,
        }
    }
}
